//! The native process API consumed by [`Processes`](crate::Processes).

use crate::handle::RawHandle;

/// One method per native call, keeping the native success conventions.
///
/// Implementations perform the call and nothing else: no validation, no error translation.
/// Failures are reported the way `kernel32` reports them (a null handle, `false`, a zero pid, or
/// `WAIT_FAILED`), with the error code left for [`ProcessApi::last_error`].
pub trait ProcessApi {
    /// `OpenProcess`. Returns [`RawHandle::NULL`] on failure.
    fn open_process(&self, desired_access: u32, inherit_handle: bool, pid: u32) -> RawHandle;

    /// `GetExitCodeProcess`. Returns `None` on failure.
    fn get_exit_code_process(&self, process: RawHandle) -> Option<u32>;

    /// `TerminateProcess`. Returns `false` on failure.
    fn terminate_process(&self, process: RawHandle, exit_code: u32) -> bool;

    /// `GetProcessId`. Returns `0` on failure.
    fn get_process_id(&self, process: RawHandle) -> u32;

    /// `GetCurrentProcess`, the pseudo-handle of the calling process.
    fn get_current_process(&self) -> RawHandle;

    /// `WaitForSingleObject`, returning the raw wait result.
    fn wait_for_single_object(&self, handle: RawHandle, milliseconds: u32) -> u32;

    /// `CloseHandle`. Returns `false` on failure.
    fn close_handle(&self, handle: RawHandle) -> bool;

    /// `GetLastError` for the calling thread.
    fn last_error(&self) -> u32;
}

impl<A: ProcessApi + ?Sized> ProcessApi for &A {
    fn open_process(&self, desired_access: u32, inherit_handle: bool, pid: u32) -> RawHandle {
        (**self).open_process(desired_access, inherit_handle, pid)
    }

    fn get_exit_code_process(&self, process: RawHandle) -> Option<u32> {
        (**self).get_exit_code_process(process)
    }

    fn terminate_process(&self, process: RawHandle, exit_code: u32) -> bool {
        (**self).terminate_process(process, exit_code)
    }

    fn get_process_id(&self, process: RawHandle) -> u32 {
        (**self).get_process_id(process)
    }

    fn get_current_process(&self) -> RawHandle {
        (**self).get_current_process()
    }

    fn wait_for_single_object(&self, handle: RawHandle, milliseconds: u32) -> u32 {
        (**self).wait_for_single_object(handle, milliseconds)
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        (**self).close_handle(handle)
    }

    fn last_error(&self) -> u32 {
        (**self).last_error()
    }
}
