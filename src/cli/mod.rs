//! Command-line interface layer.
//!
//! Parses arguments, runs the requested command against the library and
//! reports results. Kept apart from `core` so the extraction engine can be
//! used as a library.

mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, ExtractArgs, LocalesArgs};
pub use exit_status::ExitStatus;
pub use run::run_cli;
