//! Host inventory commands.

use crate::api::types::Host;
use crate::api::{execute, DatadogClient};
use crate::cli::HostCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::textutil::format_tags;
use comfy_table::{Cell, Color, Table};
use serde_json::json;

pub async fn run(cmd: HostCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        HostCommand::List {
            filter,
            limit,
            format,
            output: output_path,
        } => {
            output::set_output_format(format);
            let response =
                execute(|| client.list_hosts(filter.as_deref(), limit), &policy).await?;
            if let Some(path) = output_path {
                output::export_to_json(&response.host_list, &path)?;
                output::success(&format!(
                    "Exported {} hosts to {path}",
                    response.host_list.len()
                ));
                return Ok(());
            }
            match format {
                OutputFormat::Json => output::print_json(&response.host_list)?,
                OutputFormat::Table => {
                    println!("{}", host_table(&response.host_list));
                    let total = response
                        .total_matching
                        .unwrap_or(response.host_list.len() as i64);
                    output::note(&format!(
                        "Showing {} of {total} hosts",
                        response.host_list.len()
                    ));
                }
            }
            Ok(())
        }

        HostCommand::Totals { format } => {
            output::set_output_format(format);
            let totals = execute(|| client.host_totals(), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&json!({
                    "total_up": totals.total_up,
                    "total_active": totals.total_active,
                }))?,
                OutputFormat::Table => {
                    output::field("Up", &totals.total_up.unwrap_or_default().to_string());
                    output::field(
                        "Active",
                        &totals.total_active.unwrap_or_default().to_string(),
                    );
                }
            }
            Ok(())
        }

        HostCommand::Mute {
            hostname,
            message,
            end,
        } => {
            let mut body = json!({});
            if let Some(message) = message {
                body["message"] = message.into();
            }
            if let Some(end) = end {
                body["end"] = end.into();
            }
            let response = execute(|| client.mute_host(&hostname, &body), &policy).await?;
            output::success(&format!(
                "Host {} muted",
                response.hostname.as_deref().unwrap_or(&hostname)
            ));
            Ok(())
        }

        HostCommand::Unmute { hostname } => {
            let response = execute(|| client.unmute_host(&hostname), &policy).await?;
            output::success(&format!(
                "Host {} unmuted",
                response.hostname.as_deref().unwrap_or(&hostname)
            ));
            Ok(())
        }
    }
}

fn host_table(hosts: &[Host]) -> Table {
    let mut table = output::new_table(&["Host", "Status", "Muted", "Apps", "Sources"]);
    for host in hosts {
        let (status, color) = match host.up {
            Some(true) => ("up", Color::Green),
            Some(false) => ("down", Color::Red),
            None => ("unknown", Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(host.name.as_deref().unwrap_or("")),
            Cell::new(status).fg(color),
            Cell::new(if host.is_muted { "yes" } else { "" }),
            Cell::new(format_tags(&host.apps, 3)),
            Cell::new(format_tags(&host.sources, 3)),
        ]);
    }
    table
}
