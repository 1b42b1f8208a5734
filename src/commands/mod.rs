//! Command group handlers.
//!
//! Each module owns one subcommand group and follows the same shape: resolve
//! inputs, route API calls through the executor, render the response in the
//! selected format.

pub mod completion;
pub mod config_cmd;
pub mod downtime;
pub mod event;
pub mod host;
pub mod investigate;
pub mod logs;
pub mod metric;
pub mod monitor;
pub mod tag;

use crate::cli::{Cli, Command};
use crate::config::load_config;
use crate::error::CliError;

/// Dispatch a parsed invocation to its handler.
///
/// `config` and `completion` run without credentials; every other group
/// loads configuration first so missing credentials fail before any flags
/// are half-applied.
pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let profile = cli.profile;
    match cli.command {
        Command::Config(cmd) => config_cmd::run(cmd, profile.as_deref()),
        Command::Completion { shell } => completion::run(shell),
        command => {
            let config = load_config(profile.as_deref())?;
            match command {
                Command::Monitor(cmd) => monitor::run(cmd, &config).await,
                Command::Metric(cmd) => metric::run(cmd, &config).await,
                Command::Event(cmd) => event::run(cmd, &config).await,
                Command::Host(cmd) => host::run(cmd, &config).await,
                Command::Tag(cmd) => tag::run(cmd, &config).await,
                Command::Downtime(cmd) => downtime::run(cmd, &config).await,
                Command::Logs(cmd) => logs::run(cmd, &config).await,
                Command::Investigate(cmd) => investigate::run(cmd, &config).await,
                Command::Config(_) | Command::Completion { .. } => {
                    unreachable!("handled above")
                }
            }
        }
    }
}
