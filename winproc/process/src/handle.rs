//! Process handles.
//!
//! [`OwnedProcessHandle`] acquires a raw handle and does `CloseHandle` on [`Drop`].
//! [`CurrentProcess`] wraps the pseudo-handle of the calling process, which the OS forbids
//! closing, so it has no release path at all.

use std::fmt;

use crate::{api::ProcessApi, error::ProcessError, Result};

/// Native representation of a `HANDLE`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(isize);

impl RawHandle {
    pub const NULL: RawHandle = RawHandle(0);

    /// Value returned by `GetCurrentProcess`.
    pub const CURRENT_PROCESS: RawHandle = RawHandle(-1);

    pub const fn new(value: isize) -> Self {
        Self(value)
    }

    pub const fn get(self) -> isize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

/// Anything that can be passed to an operation expecting a process handle.
pub trait AsProcessHandle {
    fn as_raw_handle(&self) -> RawHandle;
}

impl<T: AsProcessHandle + ?Sized> AsProcessHandle for &T {
    fn as_raw_handle(&self) -> RawHandle {
        (**self).as_raw_handle()
    }
}

/// Returns the raw value of `handle`, rejecting values no native call would accept.
pub(crate) fn validate(handle: &impl AsProcessHandle) -> Result<RawHandle> {
    let raw = handle.as_raw_handle();

    if raw.is_null() {
        return Err(ProcessError::validation(
            "handle",
            "null is not a valid process handle",
        ));
    }

    Ok(raw)
}

/// Releases `raw` through `api`.
///
/// The current process pseudo-handle is rejected here even though [`CurrentProcess`] never hands
/// it to this function, since closing it is an error the OS reports.
pub(crate) fn close_raw<A: ProcessApi + ?Sized>(api: &A, raw: RawHandle) -> Result<()> {
    if raw == RawHandle::CURRENT_PROCESS {
        return Err(ProcessError::validation(
            "handle",
            "the current process pseudo-handle cannot be closed",
        ));
    }

    if raw.is_null() {
        return Err(ProcessError::validation(
            "handle",
            "null is not a valid process handle",
        ));
    }

    if api.close_handle(raw) {
        Ok(())
    } else {
        Err(ProcessError::last_error(api, "CloseHandle"))
    }
}

/// Owned handle to a process object, closed on drop.
pub struct OwnedProcessHandle<'a, A: ProcessApi + ?Sized> {
    api: &'a A,
    raw: RawHandle,
}

impl<'a, A: ProcessApi + ?Sized> OwnedProcessHandle<'a, A> {
    /// Takes ownership of `raw`, which will be closed through `api`.
    ///
    /// # Safety
    ///
    /// `raw` must be an open process handle that nothing else closes.
    pub unsafe fn from_raw(api: &'a A, raw: RawHandle) -> Self {
        Self { api, raw }
    }

    /// Gives up ownership without closing; the caller becomes responsible for the handle.
    pub fn into_raw(mut self) -> RawHandle {
        std::mem::replace(&mut self.raw, RawHandle::NULL)
    }

    /// Closes the handle, reporting failure instead of logging it like [`Drop`] does.
    pub fn close(mut self) -> Result<()> {
        let raw = std::mem::replace(&mut self.raw, RawHandle::NULL);
        close_raw(self.api, raw)
    }
}

impl<A: ProcessApi + ?Sized> AsProcessHandle for OwnedProcessHandle<'_, A> {
    fn as_raw_handle(&self) -> RawHandle {
        self.raw
    }
}

impl<A: ProcessApi + ?Sized> fmt::Debug for OwnedProcessHandle<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedProcessHandle").field(&self.raw).finish()
    }
}

impl<A: ProcessApi + ?Sized> Drop for OwnedProcessHandle<'_, A> {
    fn drop(&mut self) {
        if self.raw.is_null() {
            return;
        }

        if let Err(error) = close_raw(self.api, self.raw) {
            tracing::warn!(handle = ?self.raw, %error, "failed to close process handle");
        }
    }
}

/// Pseudo-handle of the calling process, valid for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentProcess {
    raw: RawHandle,
}

impl CurrentProcess {
    pub(crate) fn new(raw: RawHandle) -> Self {
        Self { raw }
    }
}

impl AsProcessHandle for CurrentProcess {
    fn as_raw_handle(&self) -> RawHandle {
        self.raw
    }
}
