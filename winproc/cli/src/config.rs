use clap::{Parser, Subcommand};
use winproc_process::Pid;

/// Environment variable holding the default probe window of `exists` and `kill`, in ms.
pub const WAIT_MS_ENV: &str = "WINPROC_WAIT_MS";

/// Environment variable holding the exit code `kill` reports to waiters.
pub const EXIT_CODE_ENV: &str = "WINPROC_EXIT_CODE";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) commands: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Check whether a process with the given id exists. Prints `true` or `false`.
    Exists {
        pid: Pid,

        /// How long to wait, in milliseconds, for a process reporting itself as running to
        /// exit before calling it alive.
        #[arg(long, env = WAIT_MS_ENV, default_value_t = 0)]
        wait: u64,
    },

    /// Print the exit code of a process, or `still active` while it runs.
    ExitCode { pid: Pid },

    /// Wait for a process to exit and print its exit code.
    Wait {
        pid: Pid,

        /// Give up after this many milliseconds. Waits forever when omitted.
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Terminate a process and all of its threads.
    Kill {
        pid: Pid,

        /// Exit code reported to whoever waits on the process.
        #[arg(long, env = EXIT_CODE_ENV, default_value_t = 1)]
        exit_code: u32,

        /// After terminating, wait this many milliseconds for the process to exit.
        #[arg(long, env = WAIT_MS_ENV, default_value_t = 0)]
        wait: u64,
    },

    /// Print the id of this process.
    Current,
}
