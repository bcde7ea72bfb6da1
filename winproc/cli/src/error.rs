use miette::Diagnostic;
use thiserror::Error;
use winproc_process::{ErrorKind, Pid, ProcessError};

pub(crate) type CliResult<T, E = CliError> = core::result::Result<T, E>;

const GENERAL_BUG: &str = "This is a bug: the OS answered in a way that is impossible for a \
                           process handle. Please report it together with the output above.";

#[derive(Debug, Error, Diagnostic)]
pub(crate) enum CliError {
    #[error("No process with id {0} is running")]
    #[diagnostic(help("The process may already have exited."))]
    ProcessNotFound(Pid, #[source] ProcessError),

    #[error("Access to process {0} was denied")]
    #[diagnostic(help("The process belongs to another user or is protected. Try running elevated."))]
    OpenDenied(Pid, #[source] ProcessError),

    #[error("Failed to open process {0}")]
    OpenProcess(Pid, #[source] ProcessError),

    #[error("Failed to terminate process {0}")]
    #[diagnostic(help("Opening the process succeeded, but it could not be terminated."))]
    TerminateProcess(Pid, #[source] ProcessError),

    #[error("Process {0} did not exit within {1}ms")]
    ExitTimeout(Pid, u64),

    #[error(transparent)]
    #[diagnostic(help("{GENERAL_BUG}"))]
    InternalConsistency(ProcessError),

    #[error(transparent)]
    Process(ProcessError),

    #[error("Failed to write output")]
    Output(#[from] std::io::Error),

    #[error("winproc only works on Windows")]
    #[diagnostic(help("The process API this tool wraps is part of kernel32."))]
    UnsupportedPlatform,
}

impl CliError {
    /// Picks the variant matching why `OpenProcess` failed for `pid`.
    pub(crate) fn open_failed(pid: Pid, error: ProcessError) -> Self {
        match error.kind() {
            Some(ErrorKind::InvalidParameter) => CliError::ProcessNotFound(pid, error),
            Some(ErrorKind::AccessDenied) => CliError::OpenDenied(pid, error),
            _ => CliError::OpenProcess(pid, error),
        }
    }
}

impl From<ProcessError> for CliError {
    fn from(error: ProcessError) -> Self {
        match error {
            ProcessError::InternalConsistency { .. } => CliError::InternalConsistency(error),
            error => CliError::Process(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use rstest::rstest;
    use winproc_process::{sys, NativeError};

    use super::*;

    fn open_error(code: u32) -> ProcessError {
        ProcessError::Native {
            function: "OpenProcess",
            error: NativeError::new(code),
        }
    }

    #[rstest]
    #[case::not_found(sys::ERROR_INVALID_PARAMETER, "No process with id 1234 is running")]
    #[case::denied(sys::ERROR_ACCESS_DENIED, "Access to process 1234 was denied")]
    #[case::other(sys::ERROR_INVALID_HANDLE, "Failed to open process 1234")]
    fn open_failed_message_leaves_cause_to_source(#[case] code: u32, #[case] expected: &str) {
        let error = CliError::open_failed(Pid::new(1234), open_error(code));

        assert_eq!(error.to_string(), expected);
        assert!(error
            .source()
            .is_some_and(|source| source.to_string().contains(&format!("os error {code}"))));
    }

    #[test]
    fn elevation_help_only_when_denied() {
        let help = |code| {
            CliError::open_failed(Pid::new(1234), open_error(code))
                .help()
                .map(|help| help.to_string())
        };

        assert!(help(sys::ERROR_ACCESS_DENIED).is_some_and(|help| help.contains("elevated")));
        assert!(help(sys::ERROR_INVALID_PARAMETER).is_some_and(|help| !help.contains("elevated")));
        assert_eq!(help(sys::ERROR_INVALID_HANDLE), None);
    }

    #[test]
    fn terminate_message_leaves_cause_to_source() {
        let error = CliError::TerminateProcess(Pid::new(1234), open_error(sys::ERROR_ACCESS_DENIED));

        assert_eq!(error.to_string(), "Failed to terminate process 1234");
        assert!(error.source().is_some());
    }

    #[test]
    fn output_message_leaves_cause_to_source() {
        let error = CliError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));

        assert_eq!(error.to_string(), "Failed to write output");
        assert!(error.source().is_some());
    }
}
