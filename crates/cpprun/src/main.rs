use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cpprun::{run_script, RunConfig};

#[derive(Parser)]
#[command(name = "cpprun")]
#[command(about = "Compile and run a single C++ source file.", long_about = None)]
#[command(version)]
#[command(override_usage = "cpprun <SOURCE> [ARGS]...")]
struct Cli {
    /// Path to the C++ source file (its first line is ignored, so it may be a `#!` line),
    /// followed by runtime arguments passed through verbatim to the compiled program.
    #[arg(
        value_name = "SOURCE",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let (source, args) = cli
        .command
        .split_first()
        .context("missing source path")?;
    let source = PathBuf::from(source);

    let config = RunConfig::from_env();
    log::debug!("compiler: {}", config.compiler.display());
    run_script(&config, &source, args)
}
