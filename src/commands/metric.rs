//! Metric query commands.

use crate::api::types::MetricQueryResponse;
use crate::api::{execute, DatadogClient};
use crate::cli::MetricCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::timerange;
use chrono::{DateTime, Utc};
use comfy_table::Table;

pub async fn run(cmd: MetricCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        MetricCommand::Query {
            query,
            from,
            to,
            format,
        } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, &to)?;
            let response = execute(
                || client.query_metrics(&query, range.from_epoch, range.to_epoch),
                &policy,
            )
            .await?;
            if let Some(error) = &response.error {
                return Err(CliError::General(format!("query failed: {error}")));
            }
            match format {
                OutputFormat::Json => output::print_json(&response.series)?,
                OutputFormat::Table => {
                    println!("{}", series_table(&response));
                    output::note(&format!("{} series", response.series.len()));
                }
            }
            Ok(())
        }

        MetricCommand::List { from, format } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, "now")?;
            let response =
                execute(|| client.list_active_metrics(range.from_epoch), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&response.metrics)?,
                OutputFormat::Table => {
                    for metric in &response.metrics {
                        println!("{metric}");
                    }
                    output::note(&format!("{} active metrics", response.metrics.len()));
                }
            }
            Ok(())
        }
    }
}

fn series_table(response: &MetricQueryResponse) -> Table {
    let mut table = output::new_table(&["Metric", "Scope", "Points", "Last Value", "At"]);
    for series in &response.series {
        let (at, last) = match series.last_value() {
            Some((ts_ms, value)) => (format_point_time(ts_ms), format!("{value:.2}")),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            series.metric.clone().unwrap_or_default(),
            series.scope.clone().unwrap_or_default(),
            series.pointlist.len().to_string(),
            last,
            at,
        ]);
    }
    table
}

fn format_point_time(epoch_ms: f64) -> String {
    DateTime::<Utc>::from_timestamp((epoch_ms / 1000.0) as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::MetricSeries;

    #[test]
    fn series_table_shows_last_non_null_point() {
        let response = MetricQueryResponse {
            status: Some("ok".to_string()),
            series: vec![MetricSeries {
                metric: Some("system.cpu.user".to_string()),
                scope: Some("host:web-1".to_string()),
                pointlist: vec![(1_700_000_000_000.0, Some(12.5)), (1_700_000_060_000.0, None)],
                ..MetricSeries::default()
            }],
            error: None,
        };
        let rendered = series_table(&response).to_string();
        assert!(rendered.contains("system.cpu.user"));
        assert!(rendered.contains("12.50"));
    }

    #[test]
    fn point_time_renders_utc() {
        assert_eq!(format_point_time(0.0), "1970-01-01 00:00:00");
    }
}
