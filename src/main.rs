//! CLI entry point for dogctl.

use clap::Parser;
use dogctl::cli::Cli;
use dogctl::{commands, output};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // DOGCTL_LOG=debug surfaces request/retry traces on stderr.
    let filter = EnvFilter::try_from_env("DOGCTL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    output::set_color_enabled(!cli.no_color);

    if let Err(err) = commands::dispatch(cli).await {
        output::emit_error(&err);
        std::process::exit(err.exit_code());
    }
}
