//! [`ProcessApi`] over the real `kernel32` functions.

use winapi::{
    shared::{
        minwindef::{FALSE, TRUE},
        ntdef::{MAKELANGID, SUBLANG_ENGLISH_US},
    },
    um::{
        errhandlingapi::GetLastError,
        handleapi::CloseHandle,
        processthreadsapi::{
            GetCurrentProcess, GetExitCodeProcess, GetProcessId, OpenProcess, TerminateProcess,
        },
        synchapi::WaitForSingleObject,
        winbase::{FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS},
        winnt::{HANDLE, LANG_ENGLISH},
    },
};

use crate::{api::ProcessApi, handle::RawHandle};

/// The `kernel32` process API. Stateless, so it can be shared freely between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Kernel32;

fn to_native(handle: RawHandle) -> HANDLE {
    handle.get() as HANDLE
}

fn from_native(handle: HANDLE) -> RawHandle {
    RawHandle::new(handle as isize)
}

impl ProcessApi for Kernel32 {
    fn open_process(&self, desired_access: u32, inherit_handle: bool, pid: u32) -> RawHandle {
        let inherit = if inherit_handle { TRUE } else { FALSE };

        from_native(unsafe { OpenProcess(desired_access, inherit, pid) })
    }

    fn get_exit_code_process(&self, process: RawHandle) -> Option<u32> {
        let mut exit_code = 0u32;

        let ret = unsafe { GetExitCodeProcess(to_native(process), &mut exit_code) };
        (ret != 0).then_some(exit_code)
    }

    fn terminate_process(&self, process: RawHandle, exit_code: u32) -> bool {
        unsafe { TerminateProcess(to_native(process), exit_code) != 0 }
    }

    fn get_process_id(&self, process: RawHandle) -> u32 {
        unsafe { GetProcessId(to_native(process)) }
    }

    fn get_current_process(&self) -> RawHandle {
        from_native(unsafe { GetCurrentProcess() })
    }

    fn wait_for_single_object(&self, handle: RawHandle, milliseconds: u32) -> u32 {
        unsafe { WaitForSingleObject(to_native(handle), milliseconds) }
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        unsafe { CloseHandle(to_native(handle)) != 0 }
    }

    fn last_error(&self) -> u32 {
        unsafe { GetLastError() }
    }
}

/// Returns the en-US system message for a Windows error code, `None` if the system has none.
pub(crate) fn format_message(code: u32) -> Option<String> {
    let mut buf: [u16; 256] = [0; 256];
    let english_us = MAKELANGID(LANG_ENGLISH, SUBLANG_ENGLISH_US);

    // Number of `TCHAR`s written, zero on failure.
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            std::ptr::null(),
            code,
            english_us as _,
            buf.as_mut_ptr(),
            buf.len() as _,
            std::ptr::null_mut(),
        )
    };
    if len == 0 {
        return None;
    }

    let message = String::from_utf16_lossy(buf.get(..len as usize)?);
    // Trailing "\r\n".
    Some(message.trim_ascii().to_string())
}
