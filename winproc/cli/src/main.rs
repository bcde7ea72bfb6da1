use clap::Parser;

// Only reachable through `execute` on Windows.
#[cfg_attr(not(windows), allow(dead_code))]
mod commands;
#[cfg_attr(not(windows), allow(dead_code))]
mod config;
#[cfg_attr(not(windows), allow(dead_code))]
mod error;
mod logging;

use crate::{config::Cli, error::CliResult};

#[cfg(windows)]
fn execute(cli: &Cli) -> CliResult<()> {
    let processes = winproc_process::Processes::native();
    let stdout = std::io::stdout();

    commands::run(&cli.commands, &processes, &mut stdout.lock())
}

#[cfg(not(windows))]
fn execute(_cli: &Cli) -> CliResult<()> {
    Err(error::CliError::UnsupportedPlatform)
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logging::init_tracing();

    execute(&cli)?;

    Ok(())
}
