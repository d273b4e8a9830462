use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// A child process to launch with inherited environment and stdio.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: PathBuf,
    arg0: Option<OsString>,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            arg0: None,
            args: Vec::new(),
        }
    }

    /// Override `argv[0]` as seen by the child. Ignored off unix.
    pub fn arg0(mut self, arg0: impl AsRef<OsStr>) -> Self {
        self.arg0 = Some(arg0.as_ref().to_os_string());
        self
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            if let Some(arg0) = &self.arg0 {
                cmd.arg0(arg0);
            }
        }
        cmd.args(&self.args);
        cmd
    }

    /// Launch the program and block until it terminates. There is no timeout.
    pub fn run(&self) -> ProcessOutcome {
        log::debug!("launch {} {:?}", self.program.display(), self.args);
        let mut child = match self.command().spawn() {
            Ok(child) => child,
            Err(err) => return ProcessOutcome::LaunchFailed(err),
        };
        match child.wait() {
            Ok(status) => ProcessOutcome::from_status(status),
            Err(err) => ProcessOutcome::WaitFailed(err),
        }
    }

    pub fn run_checked(&self) -> Result<(), ProcessError> {
        self.run().into_result(&self.program)
    }
}

#[derive(Debug)]
pub enum ProcessOutcome {
    Success,
    Exited(i32),
    Signaled(i32),
    LaunchFailed(io::Error),
    WaitFailed(io::Error),
}

impl ProcessOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return if code == 0 {
                ProcessOutcome::Success
            } else {
                ProcessOutcome::Exited(code)
            };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt as _;
            if let Some(signal) = status.signal() {
                return ProcessOutcome::Signaled(signal);
            }
        }
        // Unreachable for statuses returned by `wait()`: a terminated child
        // has either an exit code or, on unix, a terminating signal.
        ProcessOutcome::Exited(1)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }

    pub fn into_result(self, program: &Path) -> Result<(), ProcessError> {
        match self {
            ProcessOutcome::Success => Ok(()),
            outcome => Err(ProcessError {
                program: program.to_path_buf(),
                outcome,
            }),
        }
    }
}

/// A non-successful [`ProcessOutcome`] together with the program it came from.
#[derive(Debug)]
pub struct ProcessError {
    program: PathBuf,
    outcome: ProcessOutcome,
}

impl ProcessError {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn outcome(&self) -> &ProcessOutcome {
        &self.outcome
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.display();
        match &self.outcome {
            ProcessOutcome::Success => write!(f, "{program} succeeded"),
            ProcessOutcome::Exited(code) => write!(f, "{program} exited with status {code}"),
            ProcessOutcome::Signaled(signal) => write!(f, "{program} killed by signal {signal}"),
            ProcessOutcome::LaunchFailed(_) => write!(f, "failed to launch {program}"),
            ProcessOutcome::WaitFailed(_) => write!(f, "failed to wait for {program}"),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.outcome {
            ProcessOutcome::LaunchFailed(err) | ProcessOutcome::WaitFailed(err) => Some(err),
            _ => None,
        }
    }
}
