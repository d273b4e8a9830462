use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const ENV_CXX: &str = "CXX";
pub const DEFAULT_CXX: &str = "/usr/bin/c++";
pub const CXX_OPT_FLAG: &str = "-O3";

pub const STAGED_PREFIX: &str = "cpprun_tmpSrc_";
pub const STAGED_SUFFIX: &str = ".cpp";
pub const STAGED_RAND_LEN: usize = 6;
pub const ARTIFACT_SUFFIX: &str = ".out";

/// Prepended to the staged source so a `#!` first line becomes a C++ comment.
pub const SENTINEL: &[u8; 2] = b"//";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub compiler: PathBuf,
    /// Directory holding the staged source and the compiled artifact.
    pub temp_dir: PathBuf,
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self {
            compiler: resolve_compiler(),
            temp_dir: std::env::temp_dir(),
        }
    }
}

pub fn resolve_compiler() -> PathBuf {
    resolve_compiler_from(std::env::var_os(ENV_CXX))
}

pub fn resolve_compiler_from(value: Option<OsString>) -> PathBuf {
    match value {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_CXX),
    }
}

pub fn artifact_path_for(staged: &Path) -> PathBuf {
    let mut p = staged.as_os_str().to_os_string();
    p.push(ARTIFACT_SUFFIX);
    PathBuf::from(p)
}
