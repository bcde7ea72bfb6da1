//! Operations on process handles.
//!
//! Each operation validates its arguments, performs a single native call through
//! [`ProcessApi`] and translates a failure into [`ProcessError::Native`] with the name of the
//! native function and the code from `GetLastError`.

use std::{fmt, time::Duration};

use tracing::Level;

use crate::{
    access::ProcessAccess,
    api::ProcessApi,
    error::ProcessError,
    handle::{self, AsProcessHandle, CurrentProcess, OwnedProcessHandle},
    pid::Pid,
    sys,
    wait::{self, WaitOutcome},
    Result,
};

/// Exit code of a process, as reported by `GetExitCodeProcess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(u32);

impl ExitCode {
    /// Reported while the process is running, but also a legal exit code: a process that calls
    /// `ExitProcess(259)` is indistinguishable from a running one without waiting on it.
    pub const STILL_ACTIVE: ExitCode = ExitCode(sys::STILL_ACTIVE);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn is_still_active(self) -> bool {
        self == Self::STILL_ACTIVE
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Process operations over a [`ProcessApi`] backend.
#[derive(Debug, Clone, Default)]
pub struct Processes<A> {
    api: A,
}

#[cfg(windows)]
impl Processes<crate::kernel32::Kernel32> {
    /// Operations over the real `kernel32` backend.
    pub fn native() -> Self {
        Self::new(crate::kernel32::Kernel32)
    }
}

impl<A: ProcessApi> Processes<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Opens an existing local process.
    ///
    /// Failures carry the native error, so callers can tell [`ErrorKind::AccessDenied`]
    /// (the process exists) from [`ErrorKind::InvalidParameter`] (no such process).
    ///
    /// [`ErrorKind::AccessDenied`]: crate::ErrorKind::AccessDenied
    /// [`ErrorKind::InvalidParameter`]: crate::ErrorKind::InvalidParameter
    #[tracing::instrument(level = Level::TRACE, skip(self), err(level = Level::TRACE))]
    pub fn open(
        &self,
        access: ProcessAccess,
        inheritable: bool,
        pid: Pid,
    ) -> Result<OwnedProcessHandle<'_, A>> {
        let raw = self.api.open_process(access.bits(), inheritable, pid.get());

        if raw.is_null() {
            return Err(ProcessError::last_error(&self.api, "OpenProcess"));
        }

        // SAFETY: `raw` was just opened and is owned by nobody else.
        Ok(unsafe { OwnedProcessHandle::from_raw(&self.api, raw) })
    }

    /// Returns the exit code of `process`, which is [`ExitCode::STILL_ACTIVE`] while it runs.
    pub fn exit_code(&self, process: &impl AsProcessHandle) -> Result<ExitCode> {
        let raw = handle::validate(process)?;

        self.api
            .get_exit_code_process(raw)
            .map(ExitCode)
            .ok_or_else(|| ProcessError::last_error(&self.api, "GetExitCodeProcess"))
    }

    /// Terminates `process` and all of its threads; waiters see `exit_code`.
    pub fn terminate(&self, process: &impl AsProcessHandle, exit_code: u32) -> Result<()> {
        let raw = handle::validate(process)?;
        tracing::debug!(handle = ?raw, exit_code, "terminating process");

        if self.api.terminate_process(raw, exit_code) {
            Ok(())
        } else {
            Err(ProcessError::last_error(&self.api, "TerminateProcess"))
        }
    }

    /// Returns the id of the process behind `process`.
    pub fn pid(&self, process: &impl AsProcessHandle) -> Result<Pid> {
        let raw = handle::validate(process)?;

        match self.api.get_process_id(raw) {
            0 => Err(ProcessError::last_error(&self.api, "GetProcessId")),
            pid => Ok(Pid::new(pid)),
        }
    }

    /// Returns the pseudo-handle of the calling process.
    pub fn current(&self) -> CurrentProcess {
        CurrentProcess::new(self.api.get_current_process())
    }

    /// Waits up to `timeout` for `process` to become signaled, `None` waiting forever.
    pub fn wait(
        &self,
        process: &impl AsProcessHandle,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome> {
        let raw = handle::validate(process)?;
        let millis = wait::timeout_millis(timeout)?;

        self.wait_millis(raw, millis)
    }

    /// Waits for `process` to terminate and returns its exit code, `None` if `timeout` elapsed
    /// first.
    pub fn wait_for_exit(
        &self,
        process: &impl AsProcessHandle,
        timeout: Option<Duration>,
    ) -> Result<Option<ExitCode>> {
        match self.wait(process, timeout)? {
            WaitOutcome::TimedOut => Ok(None),
            WaitOutcome::Signaled => self.exit_code(process).map(Some),
            WaitOutcome::Abandoned => Err(ProcessError::InternalConsistency {
                function: "WaitForSingleObject",
                reason: "a process handle reported an abandoned wait".to_string(),
            }),
        }
    }

    /// Closes `process`, reporting failure instead of only logging it.
    pub fn close(&self, process: OwnedProcessHandle<'_, A>) -> Result<()> {
        process.close()
    }

    pub(crate) fn wait_millis(&self, raw: handle::RawHandle, millis: u32) -> Result<WaitOutcome> {
        match self.api.wait_for_single_object(raw, millis) {
            sys::WAIT_FAILED => Err(ProcessError::last_error(&self.api, "WaitForSingleObject")),
            result => WaitOutcome::from_raw(result).ok_or_else(|| {
                ProcessError::InternalConsistency {
                    function: "WaitForSingleObject",
                    reason: format!("unexpected wait result {result:#x}"),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{error::ErrorKind, handle::RawHandle, testing::MockApi};

    #[test]
    fn open_passes_arguments_through() {
        let api = MockApi::running();
        let processes = Processes::new(&api);

        let process = processes
            .open(ProcessAccess::TERMINATE, true, Pid::new(1234))
            .unwrap();

        assert_eq!(
            api.last_open(),
            Some((ProcessAccess::TERMINATE.bits(), true, 1234))
        );
        assert_eq!(processes.pid(&process).unwrap(), Pid::new(1234));
    }

    #[rstest]
    #[case(sys::ERROR_ACCESS_DENIED, ErrorKind::AccessDenied)]
    #[case(sys::ERROR_INVALID_PARAMETER, ErrorKind::InvalidParameter)]
    #[case(sys::ERROR_INVALID_HANDLE, ErrorKind::Other)]
    fn open_failure_carries_code(#[case] code: u32, #[case] kind: ErrorKind) {
        let api = MockApi::running().with_open_error(code);
        let processes = Processes::new(&api);

        let error = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap_err();

        assert!(matches!(
            error,
            ProcessError::Native {
                function: "OpenProcess",
                ..
            }
        ));
        assert_eq!(error.native_code(), Some(code));
        assert_eq!(error.kind(), Some(kind));
        assert_eq!(api.closed(), 0);
    }

    #[test]
    fn exit_code_of_running_process() {
        let api = MockApi::running();
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap();

        let code = processes.exit_code(&process).unwrap();

        assert!(code.is_still_active());
    }

    #[test]
    fn exit_code_failure() {
        let api = MockApi::running().with_exit_code_error(sys::ERROR_ACCESS_DENIED);
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::SYNCHRONIZE, false, Pid::new(1234))
            .unwrap();

        let error = processes.exit_code(&process).unwrap_err();

        assert!(matches!(
            error,
            ProcessError::Native {
                function: "GetExitCodeProcess",
                ..
            }
        ));
        assert_eq!(error.kind(), Some(ErrorKind::AccessDenied));
    }

    #[test]
    fn terminate_then_wait_for_exit() {
        let api = MockApi::running();
        let processes = Processes::new(&api);
        let process = processes
            .open(
                ProcessAccess::TERMINATE | ProcessAccess::QUERY_AND_WAIT,
                false,
                Pid::new(1234),
            )
            .unwrap();

        processes.terminate(&process, 7).unwrap();
        let code = processes
            .wait_for_exit(&process, Some(Duration::from_secs(1)))
            .unwrap();

        assert_eq!(code, Some(ExitCode::new(7)));
        assert_eq!(api.terminated(), 1);
        assert_eq!(api.last_wait_millis(), Some(1000));
    }

    #[test]
    fn terminate_failure() {
        let api = MockApi::running().with_terminate_error(sys::ERROR_ACCESS_DENIED);
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::TERMINATE, false, Pid::new(1234))
            .unwrap();

        let error = processes.terminate(&process, 1).unwrap_err();

        assert_eq!(error.kind(), Some(ErrorKind::AccessDenied));
    }

    #[test]
    fn wait_for_exit_times_out() {
        let api = MockApi::running();
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap();

        assert_eq!(processes.wait_for_exit(&process, None).unwrap(), None);
        assert_eq!(api.last_wait_millis(), Some(sys::INFINITE));
    }

    #[rstest]
    #[case(sys::WAIT_ABANDONED)]
    #[case(0x42)]
    fn wait_for_exit_impossible_outcome(#[case] raw: u32) {
        let api = MockApi::running().with_wait_result(raw);
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap();

        assert!(matches!(
            processes.wait_for_exit(&process, Some(Duration::ZERO)),
            Err(ProcessError::InternalConsistency { .. })
        ));
    }

    #[test]
    fn wait_failed_is_a_native_error() {
        let api = MockApi::running().with_wait_result(sys::WAIT_FAILED);
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap();

        let error = processes.wait(&process, Some(Duration::ZERO)).unwrap_err();

        assert!(matches!(
            error,
            ProcessError::Native {
                function: "WaitForSingleObject",
                ..
            }
        ));
    }

    #[test]
    fn current_process() {
        let api = MockApi::running().with_current_pid(4242);
        let processes = Processes::new(&api);

        let current = processes.current();

        assert_eq!(current.as_raw_handle(), RawHandle::CURRENT_PROCESS);
        assert_eq!(processes.pid(&current).unwrap(), Pid::new(4242));
        assert_eq!(api.opened(), 0);
    }

    #[test]
    fn invalid_handle_is_rejected_before_native_call() {
        let api = MockApi::running();
        let processes = Processes::new(&api);
        // SAFETY: a null handle is skipped on drop.
        let process = unsafe { OwnedProcessHandle::from_raw(&api, RawHandle::NULL) };

        assert!(matches!(
            processes.exit_code(&process),
            Err(ProcessError::Validation { .. })
        ));
        assert!(matches!(
            processes.terminate(&process, 1),
            Err(ProcessError::Validation { .. })
        ));
        assert!(matches!(
            processes.wait(&process, None),
            Err(ProcessError::Validation { .. })
        ));
        assert_eq!(api.exit_code_queries(), 0);
        assert_eq!(api.terminated(), 0);
        assert_eq!(api.waits(), 0);
    }

    #[test]
    fn explicit_close() {
        let api = MockApi::running();
        let processes = Processes::new(&api);
        let process = processes
            .open(ProcessAccess::QUERY_AND_WAIT, false, Pid::new(1234))
            .unwrap();

        processes.close(process).unwrap();

        assert_eq!(api.closed(), 1);
        assert_eq!(api.open_handles(), 0);
    }
}
