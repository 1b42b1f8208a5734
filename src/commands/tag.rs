//! Host tag commands.

use crate::api::{execute, DatadogClient};
use crate::cli::TagCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::textutil::{format_tags, parse_tags};

pub async fn run(cmd: TagCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        TagCommand::List { format } => {
            output::set_output_format(format);
            let response = execute(|| client.list_all_tags(), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&response.tags)?,
                OutputFormat::Table => {
                    let mut table = output::new_table(&["Tag", "Hosts"]);
                    for (tag, hosts) in &response.tags {
                        table.add_row(vec![tag.clone(), format_tags(hosts, 5)]);
                    }
                    println!("{table}");
                    output::note(&format!("{} tags", response.tags.len()));
                }
            }
            Ok(())
        }

        TagCommand::Get { hostname, format } => {
            output::set_output_format(format);
            let response = execute(|| client.host_tags(&hostname), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&response.tags)?,
                OutputFormat::Table => {
                    output::field("Host", &hostname);
                    for tag in &response.tags {
                        println!("  {tag}");
                    }
                    output::note(&format!("{} tags", response.tags.len()));
                }
            }
            Ok(())
        }

        TagCommand::Add { hostname, tags } => {
            let parsed = parse_tags(&tags);
            if parsed.is_empty() {
                return Err(CliError::Usage(
                    "No tags given. Pass a comma-separated list like env:prod,team:core"
                        .to_string(),
                ));
            }
            execute(|| client.add_host_tags(&hostname, &parsed), &policy).await?;
            output::success(&format!("Added {} tag(s) to {hostname}", parsed.len()));
            Ok(())
        }
    }
}
