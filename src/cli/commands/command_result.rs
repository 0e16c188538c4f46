use crate::diagnostics::Diagnostic;

/// What `generate` did with the rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Written to the output path (created or replaced).
    Written,
    /// The existing artifact already had the rendered content.
    Unchanged,
    /// `--check`: the existing artifact matches.
    UpToDate,
    /// `--check`: the existing artifact is missing or differs.
    Stale,
    /// `--stdout`: the artifact text.
    Printed(String),
}

#[derive(Debug)]
pub struct GenerateSummary {
    pub status: ArtifactStatus,
    /// Output path as shown to the user.
    pub output: String,
    pub schema_count: usize,
    pub model_file_count: usize,
    /// Fail when any diagnostic was recorded.
    pub strict: bool,
}

#[derive(Debug)]
pub enum CommandSummary {
    Generate(GenerateSummary),
    Init,
}

/// Result of running realmgen commands
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Skipped fields and declarations.
    /// Empty for non-generate commands.
    pub diagnostics: Vec<Diagnostic>,
}
