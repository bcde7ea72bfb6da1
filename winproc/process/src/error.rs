//! Error types for process operations.
//!
//! A failed native call is captured as a [`NativeError`] (the code returned by `GetLastError`)
//! and classified into an [`ErrorKind`] by [`ErrorKind::from_code`], the single mapping from
//! numeric codes to the kinds callers branch on.

use std::fmt::{self, Debug, Display};

use thiserror::Error;

use crate::{api::ProcessApi, sys};

pub type Result<T, E = ProcessError> = std::result::Result<T, E>;

/// Symbolic classification of a native error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `ERROR_ACCESS_DENIED`: the object exists but the caller may not access it.
    AccessDenied,
    /// `ERROR_INVALID_PARAMETER`: for `OpenProcess`, no process with that id is known.
    InvalidParameter,
    Other,
}

impl ErrorKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            sys::ERROR_ACCESS_DENIED => ErrorKind::AccessDenied,
            sys::ERROR_INVALID_PARAMETER => ErrorKind::InvalidParameter,
            _ => ErrorKind::Other,
        }
    }
}

/// Windows system error code, usually obtained from `GetLastError` right after a failed call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeError {
    code: u32,
}

impl NativeError {
    pub fn new(code: u32) -> Self {
        Self { code }
    }

    /// Reads the calling thread's last error through `api`.
    pub fn last_error<A: ProcessApi + ?Sized>(api: &A) -> Self {
        Self::new(api.last_error())
    }

    /// Raw Windows system error code.
    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(self.code)
    }

    /// Returns an en-US description of the error code.
    ///
    /// On Windows this is the system message; elsewhere only the codes this crate branches on
    /// have a description.
    pub fn message(&self) -> Option<String> {
        #[cfg(windows)]
        if let Some(message) = crate::kernel32::format_message(self.code) {
            return Some(message);
        }

        match self.code {
            sys::ERROR_ACCESS_DENIED => Some("Access is denied.".to_string()),
            sys::ERROR_INVALID_PARAMETER => Some("The parameter is incorrect.".to_string()),
            sys::ERROR_INVALID_HANDLE => Some("The handle is invalid.".to_string()),
            _ => None,
        }
    }
}

impl From<u32> for NativeError {
    fn from(code: u32) -> Self {
        NativeError::new(code)
    }
}

impl Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{message} (os error {})", self.code),
            None => write!(f, "os error {}", self.code),
        }
    }
}

impl Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeError")
            .field("code", &self.code)
            .field("kind", &self.kind())
            .finish()
    }
}

impl std::error::Error for NativeError {}

#[derive(Debug, Error)]
pub enum ProcessError {
    /// Malformed input, rejected before any native call.
    #[error("invalid value for `{name}`: {reason}")]
    Validation { name: &'static str, reason: String },

    /// A native call reported failure.
    #[error("`{function}` failed: {error}")]
    Native {
        function: &'static str,
        error: NativeError,
    },

    /// The OS answered with something that cannot happen for a process handle.
    #[error("inconsistent result from `{function}`: {reason}")]
    InternalConsistency {
        function: &'static str,
        reason: String,
    },
}

impl ProcessError {
    pub fn validation(name: &'static str, reason: impl Into<String>) -> Self {
        ProcessError::Validation {
            name,
            reason: reason.into(),
        }
    }

    pub fn native(function: &'static str, error: impl Into<NativeError>) -> Self {
        ProcessError::Native {
            function,
            error: error.into(),
        }
    }

    /// Builds a [`ProcessError::Native`] from the last error recorded by `api`.
    ///
    /// Must be called immediately after the failed call, before anything else can overwrite the
    /// thread's last error.
    pub fn last_error<A: ProcessApi + ?Sized>(api: &A, function: &'static str) -> Self {
        Self::native(function, NativeError::last_error(api))
    }

    /// Kind of the native error, `None` for errors that didn't come from a native call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ProcessError::Native { error, .. } => Some(error.kind()),
            _ => None,
        }
    }

    pub fn native_code(&self) -> Option<u32> {
        match self {
            ProcessError::Native { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}
