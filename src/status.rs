use std::fmt;
use std::process::ExitStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    Exited(i32),
}

impl Status {
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running)
    }

    /// Signal deaths are reported as `128 + signal`, the way shells do.
    pub fn from_exit(exit: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        let code = exit
            .code()
            .or_else(|| exit.signal().map(|signal| 128 + signal))
            .unwrap_or(-1);
        Status::Exited(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotStarted => write!(f, "Not started"),
            Status::Running => write!(f, "Running"),
            Status::Exited(code) => write!(f, "Exited ({})", code),
        }
    }
}

/// How a `stop()` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    AlreadyExited,
    Terminated,
    Killed,
}
