//! Shell completion generation.

use crate::cli::Cli;
use crate::error::CliError;
use clap::CommandFactory;
use clap_complete::{generate, Shell};

/// Write a completion script for `shell` to stdout.
///
/// Usage: `dogctl completion zsh > ~/.zfunc/_dogctl`
pub fn run(shell: Shell) -> Result<(), CliError> {
    let mut command = Cli::command();
    generate(shell, &mut command, "dogctl", &mut std::io::stdout());
    Ok(())
}
