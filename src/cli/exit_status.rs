use std::process::ExitCode;

use super::commands::{ArtifactStatus, CommandResult, CommandSummary};

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed successfully
/// - `Failure` (1): Command completed but the artifact is stale (`--check`)
///   or fields were skipped (`--strict`)
/// - `Error` (2): Command failed due to internal error (parse error, config error, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed successfully.
    Success,
    /// Command completed but found problems.
    Failure,
    /// Command failed due to internal error (parse error, config error, etc.).
    Error,
}

impl From<&CommandResult> for ExitStatus {
    fn from(result: &CommandResult) -> Self {
        match &result.summary {
            CommandSummary::Generate(summary) => {
                let stale = summary.status == ArtifactStatus::Stale;
                let strict_violation = summary.strict && !result.diagnostics.is_empty();
                if stale || strict_violation {
                    ExitStatus::Failure
                } else {
                    ExitStatus::Success
                }
            }
            CommandSummary::Init => ExitStatus::Success,
        }
    }
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
