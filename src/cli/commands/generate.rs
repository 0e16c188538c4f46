use std::fs;

use anyhow::{Context, Result};

use super::{ArtifactStatus, CommandResult, CommandSummary, GenerateSummary};
use crate::{cli::args::GenerateCommand, core::GenerateContext, emit};

pub fn generate(cmd: GenerateCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = GenerateContext::new(args)?;
    let generation = ctx.generate()?;

    ctx.progress("> generating schemas");
    let artifact = emit::render(
        &generation.registry,
        ctx.format(),
        ctx.config.short_scalar_properties,
    )?;

    let existing = fs::read_to_string(&ctx.output).ok();
    let status = if args.stdout {
        ArtifactStatus::Printed(artifact)
    } else if args.check {
        if existing.as_deref() == Some(artifact.as_str()) {
            ArtifactStatus::UpToDate
        } else {
            ArtifactStatus::Stale
        }
    } else if existing.as_deref() == Some(artifact.as_str()) {
        ArtifactStatus::Unchanged
    } else {
        if let Some(parent) = ctx.output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&ctx.output, &artifact)
            .with_context(|| format!("Failed to write file: {}", ctx.output.display()))?;
        ArtifactStatus::Written
    };
    ctx.progress("> finished generating schemas");
    ctx.progress("done");

    Ok(CommandResult {
        summary: CommandSummary::Generate(GenerateSummary {
            status,
            output: ctx.display_output(),
            schema_count: generation.registry.len(),
            model_file_count: generation.model_files.len(),
            strict: args.strict,
        }),
        diagnostics: generation.diagnostics,
    })
}
