//! Report formatting and printing.
//!
//! Diagnostics go to stderr in cargo style; the summary line goes to stdout,
//! except with `--stdout`, where stdout carries the artifact alone.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{ArtifactStatus, CommandResult, CommandSummary, GenerateSummary};
use crate::{config::CONFIG_FILE_NAME, diagnostics::Diagnostic};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult) {
    print_to(result, &mut io::stdout().lock(), &mut io::stderr().lock());
}

pub fn print_to<O: Write, E: Write>(result: &CommandResult, out: &mut O, err: &mut E) {
    for diagnostic in &result.diagnostics {
        print_diagnostic(diagnostic, err);
    }

    match &result.summary {
        CommandSummary::Generate(summary) => {
            print_generate_summary(summary, result.diagnostics.len(), out, err)
        }
        CommandSummary::Init => {
            let _ = writeln!(
                out,
                "{} {}",
                SUCCESS_MARK.green(),
                format!("Created {}", CONFIG_FILE_NAME).green()
            );
        }
    }
}

fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        "warning".bold().yellow(),
        diagnostic,
        diagnostic.rule().to_string().dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), diagnostic.location);
}

fn print_generate_summary<O: Write, E: Write>(
    summary: &GenerateSummary,
    warning_count: usize,
    out: &mut O,
    err: &mut E,
) {
    if let ArtifactStatus::Printed(artifact) = &summary.status {
        let _ = write!(out, "{}", artifact);
        print_strict_failure(summary, warning_count, err);
        return;
    }

    let schemas = plural(summary.schema_count, "schema", "schemas");
    let files = plural(summary.model_file_count, "model file", "model files");

    if warning_count > 0 {
        let _ = writeln!(
            out,
            "{} {}",
            "warning:".bold().yellow(),
            plural(warning_count, "field or declaration skipped", "fields or declarations skipped")
        );
    }

    let line = match summary.status {
        ArtifactStatus::Written => format!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Generated {} from {} into {}", schemas, files, summary.output).green()
        ),
        ArtifactStatus::Unchanged | ArtifactStatus::UpToDate => format!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("{} is up to date ({})", summary.output, schemas).green()
        ),
        ArtifactStatus::Stale => format!(
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} is out of date, run `realmgen generate`", summary.output).red()
        ),
        ArtifactStatus::Printed(_) => return,
    };
    let _ = writeln!(out, "{}", line);

    print_strict_failure(summary, warning_count, out);
}

fn print_strict_failure<W: Write>(summary: &GenerateSummary, warning_count: usize, writer: &mut W) {
    if summary.strict && warning_count > 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} with --strict", plural(warning_count, "problem", "problems")).red()
        );
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}
