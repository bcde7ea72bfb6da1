//! Scriptable [`ProcessApi`] for tests.
//!
//! [`MockApi`] answers every native call from a fixed script (open error, exit code, wait
//! result, ...) and counts the calls it receives, so tests can check both the answer and the
//! calls made to reach it.

use std::{cell::RefCell, collections::HashMap};

use crate::{api::ProcessApi, handle::RawHandle, sys};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Calls {
    open: usize,
    successful_open: usize,
    exit_code: usize,
    terminate: usize,
    process_id: usize,
    current: usize,
    wait: usize,
    close: usize,
}

impl Calls {
    fn total(&self) -> usize {
        self.open
            + self.exit_code
            + self.terminate
            + self.process_id
            + self.current
            + self.wait
            + self.close
    }
}

#[derive(Debug)]
struct MockState {
    next_handle: isize,
    /// Open handles and the pid each refers to.
    handles: HashMap<isize, u32>,
    /// Exit codes of the processes terminated through this api.
    terminated: HashMap<u32, u32>,
    last_error: u32,
    last_open: Option<(u32, bool, u32)>,
    last_wait_millis: Option<u32>,
    calls: Calls,
}

/// A fake `kernel32` where every process behaves the same way.
#[derive(Debug)]
pub struct MockApi {
    open_error: Option<u32>,
    exit_code: Result<u32, u32>,
    wait_result: u32,
    terminate_error: Option<u32>,
    current_pid: u32,
    state: RefCell<MockState>,
}

impl MockApi {
    /// Every process can be opened, reports `STILL_ACTIVE` and doesn't exit while waited on.
    pub fn running() -> Self {
        Self {
            open_error: None,
            exit_code: Ok(sys::STILL_ACTIVE),
            wait_result: sys::WAIT_TIMEOUT,
            terminate_error: None,
            current_pid: 1000,
            state: RefCell::new(MockState {
                next_handle: 0x100,
                handles: HashMap::new(),
                terminated: HashMap::new(),
                last_error: 0,
                last_open: None,
                last_wait_millis: None,
                calls: Calls::default(),
            }),
        }
    }

    /// `OpenProcess` fails with `code`.
    pub fn with_open_error(mut self, code: u32) -> Self {
        self.open_error = Some(code);
        self
    }

    /// `GetExitCodeProcess` reports `code`.
    pub fn with_exit_code(mut self, code: u32) -> Self {
        self.exit_code = Ok(code);
        self
    }

    /// `GetExitCodeProcess` fails with `code`.
    pub fn with_exit_code_error(mut self, code: u32) -> Self {
        self.exit_code = Err(code);
        self
    }

    /// `WaitForSingleObject` returns `raw`.
    pub fn with_wait_result(mut self, raw: u32) -> Self {
        self.wait_result = raw;
        self
    }

    /// `TerminateProcess` fails with `code`.
    pub fn with_terminate_error(mut self, code: u32) -> Self {
        self.terminate_error = Some(code);
        self
    }

    pub fn with_current_pid(mut self, pid: u32) -> Self {
        self.current_pid = pid;
        self
    }

    fn calls(&self) -> Calls {
        self.state.borrow().calls
    }

    /// Number of `OpenProcess` calls, failed ones included.
    pub fn opened(&self) -> usize {
        self.calls().open
    }

    pub fn successful_opens(&self) -> usize {
        self.calls().successful_open
    }

    /// Number of `CloseHandle` calls, failed ones included.
    pub fn closed(&self) -> usize {
        self.calls().close
    }

    pub fn exit_code_queries(&self) -> usize {
        self.calls().exit_code
    }

    pub fn terminated(&self) -> usize {
        self.calls().terminate
    }

    pub fn waits(&self) -> usize {
        self.calls().wait
    }

    /// Number of native calls of any kind, `GetLastError` excluded.
    pub fn native_calls(&self) -> usize {
        self.calls().total()
    }

    /// Handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.state.borrow().handles.len()
    }

    /// Arguments of the last `OpenProcess` call.
    pub fn last_open(&self) -> Option<(u32, bool, u32)> {
        self.state.borrow().last_open
    }

    /// Timeout of the last `WaitForSingleObject` call.
    pub fn last_wait_millis(&self) -> Option<u32> {
        self.state.borrow().last_wait_millis
    }

    /// Pid behind `handle`, `None` for handles that aren't open.
    fn pid_of(&self, handle: RawHandle) -> Option<u32> {
        if handle == RawHandle::CURRENT_PROCESS {
            return Some(self.current_pid);
        }

        self.state.borrow().handles.get(&handle.get()).copied()
    }

    fn fail(&self, code: u32) {
        self.state.borrow_mut().last_error = code;
    }
}

impl ProcessApi for MockApi {
    fn open_process(&self, desired_access: u32, inherit_handle: bool, pid: u32) -> RawHandle {
        let mut state = self.state.borrow_mut();
        state.calls.open += 1;
        state.last_open = Some((desired_access, inherit_handle, pid));

        if let Some(code) = self.open_error {
            state.last_error = code;
            return RawHandle::NULL;
        }

        state.calls.successful_open += 1;
        let handle = state.next_handle;
        state.next_handle += 4;
        state.handles.insert(handle, pid);

        RawHandle::new(handle)
    }

    fn get_exit_code_process(&self, process: RawHandle) -> Option<u32> {
        self.state.borrow_mut().calls.exit_code += 1;

        let Some(pid) = self.pid_of(process) else {
            self.fail(sys::ERROR_INVALID_HANDLE);
            return None;
        };

        if let Some(code) = self.state.borrow().terminated.get(&pid) {
            return Some(*code);
        }

        match self.exit_code {
            Ok(code) => Some(code),
            Err(code) => {
                self.fail(code);
                None
            }
        }
    }

    fn terminate_process(&self, process: RawHandle, exit_code: u32) -> bool {
        self.state.borrow_mut().calls.terminate += 1;

        let Some(pid) = self.pid_of(process) else {
            self.fail(sys::ERROR_INVALID_HANDLE);
            return false;
        };

        if let Some(code) = self.terminate_error {
            self.fail(code);
            return false;
        }

        self.state.borrow_mut().terminated.insert(pid, exit_code);
        true
    }

    fn get_process_id(&self, process: RawHandle) -> u32 {
        self.state.borrow_mut().calls.process_id += 1;

        self.pid_of(process).unwrap_or_else(|| {
            self.fail(sys::ERROR_INVALID_HANDLE);
            0
        })
    }

    fn get_current_process(&self) -> RawHandle {
        self.state.borrow_mut().calls.current += 1;
        RawHandle::CURRENT_PROCESS
    }

    fn wait_for_single_object(&self, handle: RawHandle, milliseconds: u32) -> u32 {
        {
            let mut state = self.state.borrow_mut();
            state.calls.wait += 1;
            state.last_wait_millis = Some(milliseconds);
        }

        let Some(pid) = self.pid_of(handle) else {
            self.fail(sys::ERROR_INVALID_HANDLE);
            return sys::WAIT_FAILED;
        };

        if self.state.borrow().terminated.contains_key(&pid) {
            return sys::WAIT_OBJECT_0;
        }

        if self.wait_result == sys::WAIT_FAILED {
            self.fail(sys::ERROR_INVALID_HANDLE);
        }

        self.wait_result
    }

    fn close_handle(&self, handle: RawHandle) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.close += 1;

        if state.handles.remove(&handle.get()).is_some() {
            true
        } else {
            state.last_error = sys::ERROR_INVALID_HANDLE;
            false
        }
    }

    fn last_error(&self) -> u32 {
        self.state.borrow().last_error
    }
}
