//! Event stream commands.

use crate::api::types::Event;
use crate::api::{execute, DatadogClient};
use crate::cli::EventCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::textutil::{parse_tags, truncate_chars};
use crate::timerange;
use chrono::{DateTime, Utc};
use comfy_table::Table;
use serde_json::json;

pub async fn run(cmd: EventCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        EventCommand::List {
            from,
            to,
            priority,
            tags,
            format,
            output: output_path,
        } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, &to)?;
            let response = execute(
                || {
                    client.list_events(
                        range.from_epoch,
                        range.to_epoch,
                        priority.map(|p| p.api_name()),
                        tags.as_deref(),
                    )
                },
                &policy,
            )
            .await?;
            if let Some(path) = output_path {
                output::export_to_json(&response.events, &path)?;
                output::success(&format!(
                    "Exported {} events to {path}",
                    response.events.len()
                ));
                return Ok(());
            }
            match format {
                OutputFormat::Json => output::print_json(&response.events)?,
                OutputFormat::Table => {
                    println!("{}", event_table(&response.events));
                    output::note(&format!("Total events: {}", response.events.len()));
                }
            }
            Ok(())
        }

        EventCommand::Post {
            title,
            text,
            tags,
            alert_type,
            format,
        } => {
            output::set_output_format(format);
            let mut body = json!({ "title": title });
            if let Some(text) = text {
                body["text"] = text.into();
            }
            if let Some(tags) = tags {
                body["tags"] = parse_tags(&tags).into();
            }
            if let Some(alert_type) = alert_type {
                body["alert_type"] = alert_type.api_name().into();
            }
            let response = execute(|| client.post_event(&body), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&response.event)?,
                OutputFormat::Table => {
                    output::success("Event posted");
                    if let Some(event) = &response.event {
                        if let Some(id) = event.id {
                            output::note(&format!("Event ID: {id}"));
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn event_table(events: &[Event]) -> Table {
    let mut table = output::new_table(&["When", "Priority", "Type", "Title", "Host"]);
    for event in events {
        table.add_row(vec![
            event
                .date_happened
                .map(format_event_time)
                .unwrap_or_default(),
            event.priority.clone().unwrap_or_default(),
            event.alert_type.clone().unwrap_or_default(),
            truncate_chars(event.title.as_deref().unwrap_or(""), 60),
            event.host.clone().unwrap_or_default(),
        ]);
    }
    table
}

fn format_event_time(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_table_renders_rows() {
        let events = vec![Event {
            id: Some(9),
            title: Some("Deploy finished".to_string()),
            date_happened: Some(1_700_000_000),
            priority: Some("normal".to_string()),
            alert_type: Some("info".to_string()),
            host: Some("web-1".to_string()),
            ..Event::default()
        }];
        let rendered = event_table(&events).to_string();
        assert!(rendered.contains("Deploy finished"));
        assert!(rendered.contains("web-1"));
        assert!(rendered.contains("2023-11-14"));
    }
}
