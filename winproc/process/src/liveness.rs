//! Process liveness.
//!
//! No single native call answers "is this process alive", so the answer is rebuilt from
//! partial signals, cheapest first:
//!
//! 1. reserved pids always exist;
//! 2. `OpenProcess` failing with `ERROR_ACCESS_DENIED` proves the process exists, while
//!    `ERROR_INVALID_PARAMETER` means the system knows no such process;
//! 3. an exit code other than `STILL_ACTIVE` means the process has exited;
//! 4. `STILL_ACTIVE` is confirmed by a wait of at most `wait`, since the process may have exited
//!    with that very code or be exiting right now.

use std::time::Duration;

use tracing::Level;

use crate::{
    access::ProcessAccess,
    api::ProcessApi,
    error::{ErrorKind, ProcessError},
    handle::AsProcessHandle,
    pid::{IntoPid, Pid},
    process::Processes,
    wait::{self, WaitOutcome},
    Result,
};

impl<A: ProcessApi> Processes<A> {
    /// Returns `true` if there's a process associated with `pid`.
    ///
    /// `wait` bounds the only blocking step, the wait confirming that a process reporting
    /// `STILL_ACTIVE` is really running. [`Duration::ZERO`] makes it an instantaneous probe; a
    /// longer `wait` lets a process that is exiting right now be reported as gone.
    ///
    /// # Errors
    ///
    /// - [`ProcessError::Validation`] for a malformed `pid` or `wait`, before any native call.
    /// - [`ProcessError::Native`] for `OpenProcess` failures other than access denied or invalid
    ///   parameter, and for failures of the later calls.
    /// - [`ProcessError::InternalConsistency`] if the wait reports an outcome impossible for a
    ///   process handle.
    pub fn pid_exists(&self, pid: impl IntoPid, wait: Duration) -> Result<bool> {
        let pid = pid.into_pid()?;
        let wait_millis = wait::timeout_millis(Some(wait))?;

        self.resolve_liveness(pid, wait_millis)
    }

    /// [`Processes::pid_exists`] without waiting.
    pub fn pid_exists_now(&self, pid: impl IntoPid) -> Result<bool> {
        self.pid_exists(pid, Duration::ZERO)
    }

    #[tracing::instrument(level = Level::TRACE, skip(self), ret, err)]
    fn resolve_liveness(&self, pid: Pid, wait_millis: u32) -> Result<bool> {
        if pid.is_reserved() {
            return Ok(true);
        }

        // The handle is closed when it goes out of scope, on every path below.
        let process = match self.open(ProcessAccess::QUERY_AND_WAIT, false, pid) {
            Ok(process) => process,
            Err(error) => {
                return match error.kind() {
                    Some(ErrorKind::AccessDenied) => {
                        tracing::debug!(%pid, "access denied, process exists");
                        Ok(true)
                    }
                    Some(ErrorKind::InvalidParameter) => {
                        tracing::debug!(%pid, "no such process");
                        Ok(false)
                    }
                    _ => Err(error),
                };
            }
        };

        let exit_code = self.exit_code(&process)?;
        if !exit_code.is_still_active() {
            tracing::debug!(%pid, %exit_code, "process has exited");
            return Ok(false);
        }

        match self.wait_millis(process.as_raw_handle(), wait_millis)? {
            WaitOutcome::TimedOut => Ok(true),
            WaitOutcome::Signaled => {
                tracing::debug!(%pid, "process exited while waiting on it");
                Ok(false)
            }
            WaitOutcome::Abandoned => Err(ProcessError::InternalConsistency {
                function: "WaitForSingleObject",
                reason: format!("abandoned wait on process {pid}"),
            }),
        }
    }
}
