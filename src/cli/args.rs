//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `generate`: Generate schemas from the model files
//! - `init`: Initialize realmgen configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::OutputFormat;

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

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Generate(cmd)) => cmd.args.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct GenerateArgs {
    /// Files or directories to load models from (default: the project directory)
    pub roots: Vec<PathBuf>,

    /// Artifact path (overrides config file)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Build configuration (tsconfig.json) used to resolve imports
    #[arg(long)]
    pub tsconfig: Option<PathBuf>,

    /// Artifact format (overrides config file)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Compare with the existing artifact instead of writing it
    #[arg(long, conflicts_with = "stdout")]
    pub check: bool,

    /// Print the artifact instead of writing it
    #[arg(long)]
    pub stdout: bool,

    /// Fail when any field or declaration was skipped
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub args: GenerateArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate schemas from tagged model interfaces
    Generate(GenerateCommand),
    /// Initialize a new .realmgenrc.json configuration file
    Init,
}
