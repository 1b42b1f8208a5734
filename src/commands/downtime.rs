//! Downtime management commands.

use crate::api::types::Downtime;
use crate::api::{execute, DatadogClient};
use crate::cli::DowntimeCommand;
use crate::config::Config;
use crate::confirm::confirm_action;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::timerange::TimeExpression;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, Table};
use serde_json::json;

pub async fn run(cmd: DowntimeCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        DowntimeCommand::List {
            format,
            output: output_path,
        } => {
            output::set_output_format(format);
            let downtimes = execute(|| client.list_downtimes(), &policy).await?;
            if let Some(path) = output_path {
                output::export_to_json(&downtimes, &path)?;
                output::success(&format!(
                    "Exported {} downtimes to {path}",
                    downtimes.len()
                ));
                return Ok(());
            }
            match format {
                OutputFormat::Json => output::print_json(&downtimes)?,
                OutputFormat::Table => {
                    println!("{}", downtime_table(&downtimes));
                    output::note(&format!("Total downtimes: {}", downtimes.len()));
                }
            }
            Ok(())
        }

        DowntimeCommand::Create {
            scope,
            from,
            to,
            message,
            format,
        } => {
            output::set_output_format(format);
            let now = Utc::now();
            let mut body = json!({ "scope": [scope] });
            if let Some(from) = from {
                body["start"] = TimeExpression::parse(&from)?.resolve(now)?.into();
            }
            if let Some(to) = to {
                body["end"] = TimeExpression::parse(&to)?.resolve(now)?.into();
            }
            if let Some(message) = message {
                body["message"] = message.into();
            }
            let downtime = execute(|| client.create_downtime(&body), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&downtime)?,
                OutputFormat::Table => {
                    output::success(&format!(
                        "Downtime {} scheduled",
                        downtime.id.unwrap_or_default()
                    ));
                    output::field("Scope", &downtime.scope.join(", "));
                }
            }
            Ok(())
        }

        DowntimeCommand::Cancel { downtime_id, yes } => {
            if !confirm_action(&format!("Cancel downtime {downtime_id}?"), yes) {
                output::warn("Aborted");
                return Ok(());
            }
            execute(|| client.cancel_downtime(downtime_id), &policy).await?;
            output::success(&format!("Downtime {downtime_id} cancelled"));
            Ok(())
        }
    }
}

fn downtime_table(downtimes: &[Downtime]) -> Table {
    let mut table = output::new_table(&["ID", "Active", "Scope", "Start", "End", "Message"]);
    for downtime in downtimes {
        let (active, color) = if downtime.disabled {
            ("disabled", Color::DarkGrey)
        } else if downtime.active {
            ("active", Color::Green)
        } else {
            ("scheduled", Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(downtime.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(active).fg(color),
            Cell::new(downtime.scope.join(", ")),
            Cell::new(downtime.start.map(format_epoch).unwrap_or_default()),
            Cell::new(
                downtime
                    .end
                    .map(format_epoch)
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(downtime.message.as_deref().unwrap_or("")),
        ]);
    }
    table
}

fn format_epoch(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| epoch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downtime_table_labels_states() {
        let downtimes = vec![
            Downtime {
                id: Some(1),
                scope: vec!["*".to_string()],
                active: true,
                ..Downtime::default()
            },
            Downtime {
                id: Some(2),
                scope: vec!["host:db-1".to_string()],
                disabled: true,
                ..Downtime::default()
            },
        ];
        let rendered = downtime_table(&downtimes).to_string();
        assert!(rendered.contains("active"));
        assert!(rendered.contains("disabled"));
        assert!(rendered.contains("host:db-1"));
    }
}
