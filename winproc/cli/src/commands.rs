use std::{io::Write, time::Duration};

use winproc_process::{Pid, ProcessAccess, ProcessApi, Processes};

use crate::{
    config::Commands,
    error::{CliError, CliResult},
};

/// Runs `command`, writing its result to `out`.
#[tracing::instrument(level = "trace", skip(processes, out))]
pub(crate) fn run<A: ProcessApi>(
    command: &Commands,
    processes: &Processes<A>,
    out: &mut impl Write,
) -> CliResult<()> {
    match *command {
        Commands::Exists { pid, wait } => {
            let exists = processes.pid_exists(pid, Duration::from_millis(wait))?;
            writeln!(out, "{exists}")?;
        }
        Commands::ExitCode { pid } => {
            let process = processes
                .open(ProcessAccess::QUERY_LIMITED_INFORMATION, false, pid)
                .map_err(|error| CliError::open_failed(pid, error))?;

            let code = processes.exit_code(&process)?;
            if code.is_still_active() {
                // Could also be a real exit code of 259; `exists` tells the two apart.
                writeln!(out, "still active")?;
            } else {
                writeln!(out, "{code}")?;
            }
        }
        Commands::Wait { pid, timeout } => {
            let process = open_for_wait(processes, pid, ProcessAccess::empty())?;

            match processes.wait_for_exit(&process, timeout.map(Duration::from_millis))? {
                Some(code) => writeln!(out, "{code}")?,
                None => return Err(CliError::ExitTimeout(pid, timeout.unwrap_or_default())),
            }
        }
        Commands::Kill {
            pid,
            exit_code,
            wait,
        } => {
            let process = open_for_wait(processes, pid, ProcessAccess::TERMINATE)?;

            processes
                .terminate(&process, exit_code)
                .map_err(|error| CliError::TerminateProcess(pid, error))?;
            tracing::info!(%pid, exit_code, "terminated process");

            if wait > 0
                && processes
                    .wait_for_exit(&process, Some(Duration::from_millis(wait)))?
                    .is_none()
            {
                return Err(CliError::ExitTimeout(pid, wait));
            }
        }
        Commands::Current => {
            let pid = processes.pid(&processes.current())?;
            writeln!(out, "{pid}")?;
        }
    }

    Ok(())
}

/// Opens `pid` with `access` plus the rights needed to wait on it and read its exit code.
fn open_for_wait<A: ProcessApi>(
    processes: &Processes<A>,
    pid: Pid,
    access: ProcessAccess,
) -> CliResult<winproc_process::OwnedProcessHandle<'_, A>> {
    processes
        .open(
            access | ProcessAccess::SYNCHRONIZE | ProcessAccess::QUERY_LIMITED_INFORMATION,
            false,
            pid,
        )
        .map_err(|error| CliError::open_failed(pid, error))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use winproc_process::{sys, testing::MockApi};

    use super::*;

    fn run_to_string(command: Commands, api: &MockApi) -> CliResult<String> {
        let processes = Processes::new(api);
        let mut out = Vec::new();

        run(&command, &processes, &mut out)?;

        Ok(String::from_utf8(out).unwrap())
    }

    #[rstest]
    #[case(MockApi::running(), "true\n")]
    #[case(MockApi::running().with_open_error(sys::ERROR_INVALID_PARAMETER), "false\n")]
    #[case(MockApi::running().with_open_error(sys::ERROR_ACCESS_DENIED), "true\n")]
    #[case(MockApi::running().with_exit_code(0), "false\n")]
    fn exists(#[case] api: MockApi, #[case] expected: &str) {
        let output = run_to_string(
            Commands::Exists {
                pid: Pid::new(1234),
                wait: 0,
            },
            &api,
        )
        .unwrap();

        assert_eq!(output, expected);
    }

    #[test]
    fn exists_passes_wait() {
        let api = MockApi::running();

        run_to_string(
            Commands::Exists {
                pid: Pid::new(1234),
                wait: 750,
            },
            &api,
        )
        .unwrap();

        assert_eq!(api.last_wait_millis(), Some(750));
    }

    #[test]
    fn exists_reports_internal_consistency() {
        let api = MockApi::running().with_wait_result(sys::WAIT_ABANDONED);

        let error = run_to_string(
            Commands::Exists {
                pid: Pid::new(1234),
                wait: 0,
            },
            &api,
        )
        .unwrap_err();

        assert!(matches!(error, CliError::InternalConsistency(_)));
        assert_eq!(api.open_handles(), 0);
    }

    #[rstest]
    #[case(MockApi::running(), "still active\n")]
    #[case(MockApi::running().with_exit_code(3), "3\n")]
    fn exit_code(#[case] api: MockApi, #[case] expected: &str) {
        let output = run_to_string(
            Commands::ExitCode {
                pid: Pid::new(1234),
            },
            &api,
        )
        .unwrap();

        assert_eq!(output, expected);
        assert_eq!(api.open_handles(), 0);
    }

    #[test]
    fn exit_code_of_unknown_process() {
        let api = MockApi::running().with_open_error(sys::ERROR_INVALID_PARAMETER);

        let error = run_to_string(
            Commands::ExitCode {
                pid: Pid::new(1234),
            },
            &api,
        )
        .unwrap_err();

        assert!(matches!(error, CliError::ProcessNotFound(pid, _) if pid == Pid::new(1234)));
    }

    #[test]
    fn kill_without_access() {
        let api = MockApi::running().with_open_error(sys::ERROR_ACCESS_DENIED);

        let error = run_to_string(
            Commands::Kill {
                pid: Pid::new(1234),
                exit_code: 1,
                wait: 0,
            },
            &api,
        )
        .unwrap_err();

        assert!(matches!(error, CliError::OpenDenied(..)));
        assert_eq!(api.terminated(), 0);
    }

    #[test]
    fn wait_times_out() {
        let api = MockApi::running();

        let error = run_to_string(
            Commands::Wait {
                pid: Pid::new(1234),
                timeout: Some(10),
            },
            &api,
        )
        .unwrap_err();

        assert!(matches!(error, CliError::ExitTimeout(_, 10)));
    }

    #[test]
    fn wait_for_exited_process() {
        let api = MockApi::running().with_wait_result(sys::WAIT_OBJECT_0).with_exit_code(5);

        let output = run_to_string(
            Commands::Wait {
                pid: Pid::new(1234),
                timeout: None,
            },
            &api,
        )
        .unwrap();

        assert_eq!(output, "5\n");
        assert_eq!(api.last_wait_millis(), Some(sys::INFINITE));
    }

    #[test]
    fn kill_and_wait() {
        let api = MockApi::running();

        let output = run_to_string(
            Commands::Kill {
                pid: Pid::new(1234),
                exit_code: 9,
                wait: 100,
            },
            &api,
        )
        .unwrap();

        assert_eq!(output, "");
        assert_eq!(api.terminated(), 1);
        assert_eq!(
            api.last_open().map(|(access, ..)| access),
            Some(
                (ProcessAccess::TERMINATE
                    | ProcessAccess::SYNCHRONIZE
                    | ProcessAccess::QUERY_LIMITED_INFORMATION)
                    .bits()
            )
        );
        assert_eq!(api.open_handles(), 0);
    }

    #[test]
    fn kill_denied() {
        let api = MockApi::running().with_terminate_error(sys::ERROR_ACCESS_DENIED);

        let error = run_to_string(
            Commands::Kill {
                pid: Pid::new(1234),
                exit_code: 1,
                wait: 0,
            },
            &api,
        )
        .unwrap_err();

        assert!(matches!(error, CliError::TerminateProcess(..)));
    }

    #[test]
    fn current() {
        let api = MockApi::running().with_current_pid(4242);

        assert_eq!(run_to_string(Commands::Current, &api).unwrap(), "4242\n");
    }
}
