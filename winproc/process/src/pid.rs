//! Process identifiers.

use std::{fmt, str::FromStr};

use crate::{error::ProcessError, Result};

/// Ids of the System Idle Process (0) and the System process (4), which always exist.
pub const RESERVED_PIDS: [u32; 2] = [0, 4];

/// A Windows process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(u32);

impl Pid {
    pub const fn new(pid: u32) -> Self {
        Self(pid)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn is_reserved(self) -> bool {
        RESERVED_PIDS.contains(&self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

impl From<Pid> for u32 {
    fn from(pid: Pid) -> Self {
        pid.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Pid {
    type Err = ProcessError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();

        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ProcessError::validation(
                "pid",
                format!("`{value}` is not an integer"),
            ));
        }

        trimmed.parse::<u32>().map(Pid).map_err(|_| {
            ProcessError::validation("pid", format!("{trimmed} is outside the range of a pid"))
        })
    }
}

/// Conversion into a validated [`Pid`].
pub trait IntoPid {
    fn into_pid(self) -> Result<Pid>;
}

impl IntoPid for Pid {
    fn into_pid(self) -> Result<Pid> {
        Ok(self)
    }
}

impl IntoPid for &str {
    fn into_pid(self) -> Result<Pid> {
        self.parse()
    }
}

impl IntoPid for &String {
    fn into_pid(self) -> Result<Pid> {
        self.parse()
    }
}

impl IntoPid for String {
    fn into_pid(self) -> Result<Pid> {
        self.parse()
    }
}

macro_rules! impl_into_pid {
    ($($int:ty),* $(,)?) => {
        $(
            impl IntoPid for $int {
                fn into_pid(self) -> Result<Pid> {
                    u32::try_from(self).map(Pid).map_err(|_| {
                        ProcessError::validation(
                            "pid",
                            format!("{self} is outside the range of a pid"),
                        )
                    })
                }
            }
        )*
    };
}

impl_into_pid!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
