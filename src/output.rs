//! Output formatting: format selection, styled terminal lines, structured
//! error emission, and JSON export.
//!
//! Data goes to stdout; chrome (status lines, errors) goes to stderr so
//! piped output stays clean.

use crate::error::CliError;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use crossterm::style::Stylize;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Output format selected per command via `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);
// Mirrors the currently selected output format so the top-level error path
// can emit machine-readable errors without threading the flag upward.
static ACTIVE_FORMAT: AtomicU8 = AtomicU8::new(0);

pub fn set_color_enabled(enabled: bool) {
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

fn color_enabled() -> bool {
    COLOR_ENABLED.load(Ordering::Relaxed)
}

/// Record the format the running command renders in.
pub fn set_output_format(format: OutputFormat) {
    let tag = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
    };
    ACTIVE_FORMAT.store(tag, Ordering::Relaxed);
}

pub fn output_format() -> OutputFormat {
    match ACTIVE_FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        _ => OutputFormat::Table,
    }
}

// ---------------------------------------------------------------------------
// Styled lines
// ---------------------------------------------------------------------------

/// Print a bold title line to stdout.
pub fn title(text: &str) {
    if color_enabled() {
        println!("{}", text.to_string().bold().cyan());
    } else {
        println!("{text}");
    }
}

/// Print one `key: value` detail row to stdout.
pub fn field(key: &str, value: &str) {
    if color_enabled() {
        println!("{} {value}", format!("{key}:").bold());
    } else {
        println!("{key}: {value}");
    }
}

/// Print a success line (`✓ ...`) to stdout.
pub fn success(msg: &str) {
    if color_enabled() {
        println!("{} {msg}", "✓".green());
    } else {
        println!("✓ {msg}");
    }
}

/// Print a secondary/dim line to stdout.
pub fn note(msg: &str) {
    if color_enabled() {
        println!("{}", msg.to_string().dim());
    } else {
        println!("{msg}");
    }
}

/// Print a warning line to stderr.
pub fn warn(msg: &str) {
    if color_enabled() {
        eprintln!("{}", msg.to_string().yellow());
    } else {
        eprintln!("{msg}");
    }
}

fn error_line(msg: &str) {
    if color_enabled() {
        eprintln!("{}", msg.to_string().red());
    } else {
        eprintln!("{msg}");
    }
}

/// Emit a command error in the active output format.
///
/// JSON mode writes one structured object to stderr; table mode writes a red
/// message plus a dim hint when one exists.
pub fn emit_error(err: &CliError) {
    let (code, status, hint) = match err {
        CliError::Api(failure) => (
            failure.category.label(),
            failure.http_status,
            failure.hint().map(str::to_string),
        ),
        CliError::Time(_) | CliError::Input(_) | CliError::Usage(_) => {
            ("VALIDATION_ERROR", None, None)
        }
        CliError::Config(_) => (
            "CONFIG_ERROR",
            None,
            Some("Run `dogctl config init` or export DD_API_KEY / DD_APP_KEY".to_string()),
        ),
        CliError::General(_) => ("ERROR", None, None),
    };

    if output_format() == OutputFormat::Json {
        let mut payload = serde_json::json!({
            "error": true,
            "code": code,
            "message": err.to_string(),
        });
        if let Some(status) = status {
            payload["status"] = status.into();
        }
        if let Some(hint) = &hint {
            payload["hint"] = hint.as_str().into();
        }
        eprintln!("{payload}");
        return;
    }

    error_line(&err.to_string());
    if let Some(hint) = hint {
        if color_enabled() {
            eprintln!("{}", hint.dim());
        } else {
            eprintln!("{hint}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tables and JSON
// ---------------------------------------------------------------------------

/// Build a table with the house preset and header row.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Pretty-print a serializable value to stdout.
pub fn print_json<T: Serialize>(data: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(data)
        .map_err(|e| CliError::General(format!("failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Write pretty-printed JSON to a file, creating parent directories.
pub fn export_to_json<T: Serialize>(data: &T, file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CliError::General(format!("failed to create {}: {e}", parent.display())))?;
    }
    let text = serde_json::to_string_pretty(data)
        .map_err(|e| CliError::General(format!("failed to serialize export: {e}")))?;
    std::fs::write(path, text + "\n")
        .map_err(|e| CliError::General(format!("failed to write {file_path}: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_renders_headers_and_rows() {
        let mut table = new_table(&["ID", "Name"]);
        table.add_row(vec!["1".to_string(), "cpu high".to_string()]);
        let rendered = table.to_string();
        assert!(rendered.contains("ID"));
        assert!(rendered.contains("cpu high"));
    }

    #[test]
    fn export_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("dogctl-export-{}", std::process::id()));
        let path = dir.join("nested").join("out.json");
        export_to_json(&serde_json::json!({"ok": true}), path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"ok\": true"));
        assert!(text.ends_with('\n'));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn format_round_trips_through_the_global() {
        set_output_format(OutputFormat::Json);
        assert_eq!(output_format(), OutputFormat::Json);
        set_output_format(OutputFormat::Table);
        assert_eq!(output_format(), OutputFormat::Table);
    }
}
