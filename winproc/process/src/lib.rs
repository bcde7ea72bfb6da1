//! Process lifecycle primitives over the Windows process API.
//!
//! The crate wraps the handful of `kernel32` calls needed to open a process by id, query its
//! exit status, wait on it and terminate it, and builds [`Processes::pid_exists`] on top of
//! them: a liveness check that tells apart running, exited, inaccessible and unknown processes.
//!
//! Native calls go through the [`ProcessApi`] trait. On Windows, [`Kernel32`] implements it
//! over `winapi`; tests (and downstream crates with the `testing` feature) use
//! [`testing::MockApi`] instead.
//!
//! ```rust,ignore
//! use std::time::Duration;
//!
//! let processes = winproc_process::Processes::native();
//! let alive = processes.pid_exists(1234u32, Duration::ZERO)?;
//! ```

pub mod access;
pub mod api;
pub mod error;
pub mod handle;
#[cfg(windows)]
pub mod kernel32;
mod liveness;
pub mod pid;
pub mod process;
pub mod sys;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wait;

#[cfg(windows)]
use std::time::Duration;

pub use access::ProcessAccess;
pub use api::ProcessApi;
pub use error::{ErrorKind, NativeError, ProcessError, Result};
pub use handle::{AsProcessHandle, CurrentProcess, OwnedProcessHandle, RawHandle};
#[cfg(windows)]
pub use kernel32::Kernel32;
pub use pid::{IntoPid, Pid};
pub use process::{ExitCode, Processes};
pub use wait::WaitOutcome;

/// Checks whether `pid` refers to an existing process, using the native [`Kernel32`] backend.
///
/// See [`Processes::pid_exists`] for the decision procedure.
#[cfg(windows)]
pub fn pid_exists(pid: impl IntoPid, wait: Duration) -> Result<bool> {
    Processes::native().pid_exists(pid, wait)
}
