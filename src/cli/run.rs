use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, generate::generate, init::init},
};

/// Dispatch to the handler of the parsed command.
///
/// # Returns
/// - `Ok(CommandResult)` with what the command did and its diagnostics
/// - `Err` if the command fails (e.g., invalid config, unreadable sources)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Generate(cmd)) => generate(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
