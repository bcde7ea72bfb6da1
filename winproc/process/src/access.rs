//! Process access rights.

use bitflags::bitflags;

use crate::sys;

bitflags! {
    /// Access rights requested when opening a process.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProcessAccess: u32 {
        const TERMINATE = sys::PROCESS_TERMINATE;
        const CREATE_THREAD = sys::PROCESS_CREATE_THREAD;
        const VM_OPERATION = sys::PROCESS_VM_OPERATION;
        const VM_READ = sys::PROCESS_VM_READ;
        const VM_WRITE = sys::PROCESS_VM_WRITE;
        const DUP_HANDLE = sys::PROCESS_DUP_HANDLE;
        const CREATE_PROCESS = sys::PROCESS_CREATE_PROCESS;
        const SET_QUOTA = sys::PROCESS_SET_QUOTA;
        const SET_INFORMATION = sys::PROCESS_SET_INFORMATION;
        const QUERY_INFORMATION = sys::PROCESS_QUERY_INFORMATION;
        const SUSPEND_RESUME = sys::PROCESS_SUSPEND_RESUME;
        const QUERY_LIMITED_INFORMATION = sys::PROCESS_QUERY_LIMITED_INFORMATION;
        /// Required to wait on the process.
        const SYNCHRONIZE = sys::SYNCHRONIZE;
        const ALL_ACCESS = sys::PROCESS_ALL_ACCESS;

        // Standard rights (DELETE, READ_CONTROL, ...) pass through untouched.
        const _ = !0;
    }
}

impl ProcessAccess {
    /// The rights needed to read the exit code and wait on a process.
    pub const QUERY_AND_WAIT: ProcessAccess =
        ProcessAccess::QUERY_INFORMATION.union(ProcessAccess::SYNCHRONIZE);
}
