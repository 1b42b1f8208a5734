//! Investigation workflows for troubleshooting.
//!
//! Each workflow issues a fixed pipeline of API calls and merges the results
//! into one report. The calls run through the cancellable executor so an
//! interrupt during a retry wait aborts the whole pipeline instead of
//! starting the next step.

use crate::api::types::{LogSearchResponse, SpansAggregateResponse};
use crate::api::{execute_with_cancel, DatadogClient};
use crate::cli::InvestigateCommand;
use crate::config::Config;
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::textutil::truncate_chars;
use crate::timerange::{self, TimeRange};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::watch;

pub async fn run(cmd: InvestigateCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    // Ctrl-C flips the cancellation signal observed by the executor.
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    match cmd {
        InvestigateCommand::Latency {
            service,
            from,
            to,
            threshold,
            format,
        } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, &to)?;
            let threshold_ns = threshold.saturating_mul(1_000_000);

            let p99_body = spans_body(
                &format!("service:{service} @duration:>{threshold_ns}"),
                &range,
                "pc99",
                Some("@duration"),
                None,
            );
            let endpoints_body = spans_body(
                &format!("service:{service}"),
                &range,
                "pc99",
                Some("@duration"),
                Some("resource_name"),
            );
            let logs_body = error_logs_body(&service, &range);

            let p99 = execute_with_cancel(
                || client.aggregate_spans(&p99_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;
            let endpoints = execute_with_cancel(
                || client.aggregate_spans(&endpoints_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;
            let logs = execute_with_cancel(
                || client.search_logs(&logs_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;

            let report = build_latency_report(&service, &range, threshold, &p99, &endpoints, &logs);
            match format {
                OutputFormat::Json => output::print_json(&report)?,
                OutputFormat::Table => print_latency_report(&report),
            }
            Ok(())
        }

        InvestigateCommand::Errors {
            service,
            from,
            to,
            format,
        } => {
            output::set_output_format(format);
            let range = timerange::resolve_now(&from, &to)?;
            let error_query = format!("service:{service} status:error");

            let totals_body = spans_body(&error_query, &range, "count", None, None);
            let by_endpoint_body =
                spans_body(&error_query, &range, "count", None, Some("resource_name"));
            let logs_body = error_logs_body(&service, &range);

            let totals = execute_with_cancel(
                || client.aggregate_spans(&totals_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;
            let by_endpoint = execute_with_cancel(
                || client.aggregate_spans(&by_endpoint_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;
            let logs = execute_with_cancel(
                || client.search_logs(&logs_body),
                &policy,
                &mut cancel_rx,
            )
            .await?;

            let report = build_errors_report(&service, &range, &totals, &by_endpoint, &logs);
            match format {
                OutputFormat::Json => output::print_json(&report)?,
                OutputFormat::Table => print_errors_report(&report),
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

fn spans_body(
    query: &str,
    range: &TimeRange,
    aggregation: &str,
    metric: Option<&str>,
    group_by_facet: Option<&str>,
) -> Value {
    let mut compute = json!({ "aggregation": aggregation });
    if let Some(metric) = metric {
        compute["metric"] = metric.into();
    }
    let group_by = match group_by_facet {
        Some(facet) => json!([{ "facet": facet }]),
        None => json!([]),
    };
    json!({
        "filter": {
            "query": query,
            "from": range.from_rfc3339(),
            "to": range.to_rfc3339(),
        },
        "compute": [compute],
        "group_by": group_by,
    })
}

fn error_logs_body(service: &str, range: &TimeRange) -> Value {
    json!({
        "filter": {
            "query": format!("service:{service} status:error"),
            "from": range.from_rfc3339(),
            "to": range.to_rfc3339(),
        },
        "page": { "limit": 100 },
    })
}

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LatencyReport {
    pub service: String,
    pub time_range: ReportRange,
    pub threshold_ms: u64,
    pub p99_latency_ms: f64,
    pub slow_endpoints: Vec<EndpointLatency>,
    pub error_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct EndpointLatency {
    pub resource_name: String,
    pub p99_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorsReport {
    pub service: String,
    pub time_range: ReportRange,
    pub error_count: u64,
    pub by_endpoint: Vec<EndpointErrors>,
    pub recent_logs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EndpointErrors {
    pub resource_name: String,
    pub count: u64,
}

fn report_range(range: &TimeRange) -> ReportRange {
    ReportRange {
        from: range.from_rfc3339(),
        to: range.to_rfc3339(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ns_to_ms(ns: f64) -> f64 {
    ns / 1_000_000.0
}

/// Merge the three latency-investigation responses into one report.
fn build_latency_report(
    service: &str,
    range: &TimeRange,
    threshold_ms: u64,
    p99: &SpansAggregateResponse,
    endpoints: &SpansAggregateResponse,
    logs: &LogSearchResponse,
) -> LatencyReport {
    let p99_ns = p99
        .data
        .as_ref()
        .and_then(|data| data.buckets.first())
        .map(|bucket| bucket.primary_compute())
        .unwrap_or(0.0);

    let mut slow_endpoints: Vec<EndpointLatency> = endpoints
        .data
        .as_ref()
        .map(|data| {
            data.buckets
                .iter()
                .map(|bucket| EndpointLatency {
                    resource_name: bucket.facet("resource_name").to_string(),
                    p99_ms: round2(ns_to_ms(bucket.primary_compute())),
                })
                .collect()
        })
        .unwrap_or_default();
    slow_endpoints.sort_by(|a, b| b.p99_ms.total_cmp(&a.p99_ms));

    LatencyReport {
        service: service.to_string(),
        time_range: report_range(range),
        threshold_ms,
        p99_latency_ms: round2(ns_to_ms(p99_ns)),
        slow_endpoints,
        error_count: logs.data.len(),
    }
}

/// Merge the three error-investigation responses into one report.
fn build_errors_report(
    service: &str,
    range: &TimeRange,
    totals: &SpansAggregateResponse,
    by_endpoint: &SpansAggregateResponse,
    logs: &LogSearchResponse,
) -> ErrorsReport {
    let error_count = totals
        .data
        .as_ref()
        .and_then(|data| data.buckets.first())
        .map(|bucket| bucket.primary_compute())
        .unwrap_or(0.0) as u64;

    let mut endpoints: Vec<EndpointErrors> = by_endpoint
        .data
        .as_ref()
        .map(|data| {
            data.buckets
                .iter()
                .map(|bucket| EndpointErrors {
                    resource_name: bucket.facet("resource_name").to_string(),
                    count: bucket.primary_compute() as u64,
                })
                .collect()
        })
        .unwrap_or_default();
    endpoints.sort_by(|a, b| b.count.cmp(&a.count));

    let recent_logs = logs
        .data
        .iter()
        .filter_map(|event| event.attributes.message.clone())
        .collect();

    ErrorsReport {
        service: service.to_string(),
        time_range: report_range(range),
        error_count,
        by_endpoint: endpoints,
        recent_logs,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_latency_report(report: &LatencyReport) {
    output::title(&format!("Latency Investigation: {}", report.service));
    let mut summary = output::new_table(&["Metric", "Value"]);
    summary.add_row(vec![
        "P99 Latency (ms)".to_string(),
        format!("{:.2}", report.p99_latency_ms),
    ]);
    summary.add_row(vec![
        "Threshold (ms)".to_string(),
        report.threshold_ms.to_string(),
    ]);
    summary.add_row(vec![
        "Error Count".to_string(),
        report.error_count.to_string(),
    ]);
    println!("{summary}");

    if !report.slow_endpoints.is_empty() {
        let mut endpoints = output::new_table(&["Endpoint", "P99 (ms)"]);
        for endpoint in &report.slow_endpoints {
            endpoints.add_row(vec![
                endpoint.resource_name.clone(),
                format!("{:.2}", endpoint.p99_ms),
            ]);
        }
        println!("{endpoints}");
    }
}

fn print_errors_report(report: &ErrorsReport) {
    output::title(&format!("Error Investigation: {}", report.service));
    output::field("Error count", &report.error_count.to_string());

    if !report.by_endpoint.is_empty() {
        let mut endpoints = output::new_table(&["Endpoint", "Errors"]);
        for endpoint in &report.by_endpoint {
            endpoints.add_row(vec![
                endpoint.resource_name.clone(),
                endpoint.count.to_string(),
            ]);
        }
        println!("{endpoints}");
    }

    if !report.recent_logs.is_empty() {
        output::note("Recent error logs:");
        for message in report.recent_logs.iter().take(5) {
            println!("  {}", truncate_chars(message, 120));
        }
    }
}
