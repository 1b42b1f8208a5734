//! Watch mode: re-render a frame at a fixed interval until Ctrl-C.

use crate::error::CliError;
use crate::output;
use crossterm::{cursor, execute, terminal};
use std::future::Future;
use std::time::Duration;

/// Run `render` every `interval_secs` (minimum 1), replacing the screen
/// contents each round. Returns cleanly on Ctrl-C; render errors propagate so
/// a mid-watch API failure still maps to its exit code.
pub async fn watch_loop<F, Fut>(mut render: F, interval_secs: u64) -> Result<(), CliError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, CliError>>,
{
    let interval = Duration::from_secs(interval_secs.max(1));
    loop {
        let frame = render().await?;
        clear_screen();
        println!("{frame}");

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    output::note("Watch stopped");
                }
                return Ok(());
            }
        }
    }
}

fn clear_screen() {
    let _ = execute!(
        std::io::stdout(),
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    );
}
