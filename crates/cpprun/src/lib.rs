//! Run a single C++ source file as if it were a script.
//!
//! The source is staged into a uniquely named temp file (with its first line
//! commented out, so a `#!` line is harmless), compiled with `$CXX` or
//! `/usr/bin/c++`, and the resulting binary is run with the caller's
//! arguments. Temp files are removed on every exit path.

pub mod pipeline;
pub mod process;
pub mod scope_guard;
pub mod toolchain;
pub mod transfer;

pub use pipeline::run_script;
pub use process::{Invocation, ProcessError, ProcessOutcome};
pub use scope_guard::{defer, ScopeGuard};
pub use toolchain::RunConfig;
pub use transfer::{transfer_all, TransferError};
