use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{extract::extract, init::init, locales::locales},
    exit_status::ExitStatus,
};

/// Main entry point for the CLI.
///
/// Dispatches to the command handler. Prints help and succeeds when no
/// command is given.
///
/// # Returns
/// - `Ok(ExitStatus)` when the command ran to completion
/// - `Err` if the command fails (missing source tree, invalid config, write errors)
pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(Arguments { command }) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    match command {
        Some(Command::Extract(args)) => extract(args),
        Some(Command::Init) => init(),
        Some(Command::Locales(args)) => locales(args),
        None => Ok(ExitStatus::Success),
    }
}
