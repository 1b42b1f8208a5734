//! Log search commands.

use crate::api::types::LogEvent;
use crate::api::{execute, DatadogClient};
use crate::cli::LogsCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::textutil::truncate_chars;
use crate::timerange::{self, TimeRange};
use comfy_table::{Cell, Color, Table};
use serde_json::{json, Value};

pub async fn run(cmd: LogsCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        LogsCommand::Search {
            query,
            from,
            to,
            limit,
            service,
            format,
            output: output_path,
        } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, &to)?;
            let body = search_body(&query, service.as_deref(), &range, limit);
            let response = execute(|| client.search_logs(&body), &policy).await?;
            if let Some(path) = output_path {
                output::export_to_json(&response.data, &path)?;
                output::success(&format!(
                    "Exported {} log events to {path}",
                    response.data.len()
                ));
                return Ok(());
            }
            match format {
                OutputFormat::Json => output::print_json(&response.data)?,
                OutputFormat::Table => {
                    println!("{}", log_table(&response.data));
                    output::note(&format!("{} log events", response.data.len()));
                }
            }
            Ok(())
        }
    }
}

/// Build the v2 log search request. A `--service` filter is folded into the
/// query string the way the original CLI composes it.
fn search_body(query: &str, service: Option<&str>, range: &TimeRange, limit: u32) -> Value {
    let full_query = match service {
        Some(service) => format!("service:{service} {query}"),
        None => query.to_string(),
    };
    json!({
        "filter": {
            "query": full_query,
            "from": range.from_rfc3339(),
            "to": range.to_rfc3339(),
        },
        "page": { "limit": limit },
        "sort": "-timestamp",
    })
}

fn status_color(status: &str) -> Color {
    match status {
        "error" | "critical" | "emergency" => Color::Red,
        "warn" | "warning" => Color::Yellow,
        "info" => Color::Cyan,
        _ => Color::White,
    }
}

fn log_table(events: &[LogEvent]) -> Table {
    let mut table = output::new_table(&["Timestamp", "Status", "Service", "Message"]);
    for event in events {
        let attrs = &event.attributes;
        let status = attrs.status.as_deref().unwrap_or("");
        table.add_row(vec![
            Cell::new(attrs.timestamp.as_deref().unwrap_or("")),
            Cell::new(status).fg(status_color(status)),
            Cell::new(attrs.service.as_deref().unwrap_or("")),
            Cell::new(truncate_chars(attrs.message.as_deref().unwrap_or(""), 100)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::LogAttributes;
    use chrono::{TimeZone, Utc};

    #[test]
    fn search_body_folds_service_into_the_query() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let range = timerange::resolve("1h", "now", now).unwrap();
        let body = search_body("status:error", Some("checkout"), &range, 25);
        assert_eq!(body["filter"]["query"], "service:checkout status:error");
        assert_eq!(body["filter"]["from"], "2026-02-10T11:00:00+00:00");
        assert_eq!(body["page"]["limit"], 25);
    }

    #[test]
    fn search_body_without_service_uses_the_raw_query() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let range = timerange::resolve("15m", "now", now).unwrap();
        let body = search_body("status:error", None, &range, 50);
        assert_eq!(body["filter"]["query"], "status:error");
    }

    #[test]
    fn log_table_renders_status_and_message() {
        let events = vec![LogEvent {
            id: Some("AQAA".to_string()),
            attributes: LogAttributes {
                timestamp: Some("2026-02-10T11:59:00Z".to_string()),
                status: Some("error".to_string()),
                service: Some("checkout".to_string()),
                message: Some("payment gateway timeout".to_string()),
                host: None,
            },
        }];
        let rendered = log_table(&events).to_string();
        assert!(rendered.contains("checkout"));
        assert!(rendered.contains("payment gateway timeout"));
    }
}
