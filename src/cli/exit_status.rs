use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, possibly with scan warnings
/// - `Failure` (1): Command completed but something needs attention
///   (config already exists, catalogs need compiling)
/// - `Error` (2): Command failed (missing source tree, bad config, write error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
