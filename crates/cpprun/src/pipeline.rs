use std::ffi::OsString;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::process::Invocation;
use crate::scope_guard::{defer, remove_if_exists};
use crate::toolchain::{
    artifact_path_for, RunConfig, CXX_OPT_FLAG, SENTINEL, STAGED_PREFIX, STAGED_RAND_LEN,
    STAGED_SUFFIX,
};

/// Stage `source` into a private temp file, compile it with the configured
/// compiler, and run the result with `args`.
///
/// Every resource acquired along the way is released on return, in reverse
/// order of acquisition, no matter which step failed: the compiled artifact
/// first, then the staged source, then the source handle.
pub fn run_script(config: &RunConfig, source_path: &Path, args: &[OsString]) -> Result<()> {
    let source = File::open(source_path)
        .with_context(|| format!("File with name {} not found", source_path.display()))?;

    // Unlinked when `staged_path` drops, on every exit path from here on.
    let (mut staged_file, staged_path) = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .suffix(STAGED_SUFFIX)
        .rand_bytes(STAGED_RAND_LEN)
        .tempfile_in(&config.temp_dir)
        .with_context(|| format!("create staged source in {}", config.temp_dir.display()))?
        .into_parts();
    log::debug!(
        "staging {} into {}",
        source_path.display(),
        staged_path.display()
    );

    staged_file
        .write_all(SENTINEL)
        .with_context(|| format!("write: {}", staged_path.display()))?;
    crate::transfer::transfer_all(&source, &staged_file).with_context(|| {
        format!(
            "stage {} into {}",
            source_path.display(),
            staged_path.display()
        )
    })?;
    // The write handle is released here; only the on-disk path stays guarded.
    drop(staged_file);

    let artifact = artifact_path_for(&staged_path);
    let _artifact_guard = {
        let artifact = artifact.clone();
        defer(move || remove_if_exists(&artifact))
    };

    Invocation::new(&config.compiler)
        .arg(CXX_OPT_FLAG)
        .arg(&*staged_path)
        .arg("-o")
        .arg(&artifact)
        .run_checked()?;
    log::debug!("compiled {}", artifact.display());

    Invocation::new(&artifact)
        .arg0(source_path)
        .args(args)
        .run_checked()?;
    Ok(())
}
