//! Wait results and timeouts for `WaitForSingleObject`.

use std::time::Duration;

use crate::{error::ProcessError, sys, Result};

/// Result of waiting on a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    /// The object was not signaled before the timeout elapsed.
    TimedOut,
    /// The object is signaled; for a process, it has terminated.
    Signaled,
    /// Mutex-only result: the owning thread exited without releasing it.
    Abandoned,
}

impl WaitOutcome {
    /// Translates a raw wait result, `None` for `WAIT_FAILED` and values `kernel32` never
    /// documents for a single object.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            sys::WAIT_TIMEOUT => Some(WaitOutcome::TimedOut),
            sys::WAIT_OBJECT_0 => Some(WaitOutcome::Signaled),
            sys::WAIT_ABANDONED => Some(WaitOutcome::Abandoned),
            _ => None,
        }
    }
}

/// Converts a timeout into milliseconds, `None` meaning wait forever.
///
/// Finite timeouts must stay below `INFINITE`, otherwise they would silently become infinite.
pub(crate) fn timeout_millis(timeout: Option<Duration>) -> Result<u32> {
    let Some(timeout) = timeout else {
        return Ok(sys::INFINITE);
    };

    u32::try_from(timeout.as_millis())
        .ok()
        .filter(|millis| *millis != sys::INFINITE)
        .ok_or_else(|| {
            ProcessError::validation(
                "timeout",
                format!(
                    "{timeout:?} exceeds the longest finite wait of {}ms",
                    sys::INFINITE - 1
                ),
            )
        })
}
