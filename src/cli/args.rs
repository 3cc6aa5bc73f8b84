//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Scan a source tree and write a gettext template (POT)
//! - `init`: Initialize the configuration file
//! - `locales`: List translation catalogs and their compiled state

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::locales::{ALLOWED_LANGUAGES_ENV, COMPILE_MO_ENV, parse_bool};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Source tree to scan (overrides config file)
    #[arg(short, long = "path", value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Translation domain to extract (overrides config file)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Output file, `-` for stdout (default: <domain>.pot)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// File or directory name, or glob, to skip; can be repeated
    #[arg(short = 'x', long = "exclude", value_name = "EXCLUDE")]
    pub excludes: Vec<String>,

    /// Directory location comments are relative to (default: the source tree)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Only scan Python files
    #[arg(long)]
    pub python_only: bool,

    /// Skip template messages that have no explicit domain
    #[arg(short = 'e', long)]
    pub exclude_default_domain: bool,

    /// File containing a custom POT header template
    #[arg(long, value_name = "FILE")]
    pub header: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Args)]
pub struct LocalesArgs {
    /// Directory holding `<lang>/LC_MESSAGES` catalogs
    #[arg(default_value = "locales")]
    pub dir: PathBuf,

    /// Translation domain (overrides config file)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Report catalogs whose .mo file is missing or outdated as errors
    #[arg(long, env = COMPILE_MO_ENV, value_parser = parse_switch)]
    pub compile_mo: bool,

    /// Only consider these languages (comma or space separated)
    #[arg(long, env = ALLOWED_LANGUAGES_ENV, value_name = "LIST")]
    pub allowed_languages: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_switch(value: &str) -> Result<bool, String> {
    parse_bool(value).map_err(|e| e.to_string())
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages into a gettext template
    Extract(ExtractArgs),
    /// Initialize a new .i18nextract.json configuration file
    Init,
    /// List translation catalogs and whether their .mo files need compiling
    Locales(LocalesArgs),
}
