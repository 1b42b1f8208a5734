//! Data model for Datadog API payloads.
//!
//! These types deserialize the subset of each response the CLI actually
//! renders. Unknown fields are ignored so schema growth on the vendor side
//! never breaks parsing; optional fields default to empty/absent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Monitors (v1)
// ---------------------------------------------------------------------------

/// One monitor as returned by the monitors API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitor {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub monitor_type: Option<String>,
    pub query: Option<String>,
    pub message: Option<String>,
    pub overall_state: Option<String>,
    pub tags: Vec<String>,
    pub priority: Option<i64>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub options: Option<serde_json::Value>,
}

impl Monitor {
    /// Monitor state normalized for display and filtering.
    pub fn state(&self) -> &str {
        self.overall_state.as_deref().unwrap_or("Unknown")
    }
}

/// Response from `POST /api/v1/monitor/validate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorValidation {
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Downtimes (v1)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Downtime {
    pub id: Option<i64>,
    pub scope: Vec<String>,
    pub message: Option<String>,
    pub disabled: bool,
    pub active: bool,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Downtime {
    /// True for an enabled downtime spanning every scope.
    pub fn is_global(&self) -> bool {
        !self.disabled && self.scope == ["*"]
    }
}

// ---------------------------------------------------------------------------
// Metrics (v1)
// ---------------------------------------------------------------------------

/// Response from `GET /api/v1/query`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricQueryResponse {
    pub status: Option<String>,
    pub series: Vec<MetricSeries>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSeries {
    pub metric: Option<String>,
    pub display_name: Option<String>,
    pub scope: Option<String>,
    /// `[timestamp_ms, value]` pairs; value may be null for gaps.
    pub pointlist: Vec<(f64, Option<f64>)>,
    pub unit: Option<serde_json::Value>,
}

impl MetricSeries {
    /// Most recent non-null point, as `(epoch_ms, value)`.
    pub fn last_value(&self) -> Option<(f64, f64)> {
        self.pointlist
            .iter()
            .rev()
            .find_map(|(ts, value)| value.map(|v| (*ts, v)))
    }
}

/// Response from `GET /api/v1/metrics` (actively reporting metrics).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActiveMetricsResponse {
    pub metrics: Vec<String>,
    pub from: Option<String>,
}

// ---------------------------------------------------------------------------
// Events (v1)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub date_happened: Option<i64>,
    pub priority: Option<String>,
    pub alert_type: Option<String>,
    pub host: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventListResponse {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPostResponse {
    pub status: Option<String>,
    pub event: Option<Event>,
}

// ---------------------------------------------------------------------------
// Hosts (v1)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Host {
    pub name: Option<String>,
    pub up: Option<bool>,
    pub is_muted: bool,
    pub aliases: Vec<String>,
    pub apps: Vec<String>,
    pub sources: Vec<String>,
    pub last_reported_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostListResponse {
    pub host_list: Vec<Host>,
    pub total_matching: Option<i64>,
    pub total_returned: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostTotals {
    pub total_up: Option<i64>,
    pub total_active: Option<i64>,
}

/// Response from host mute/unmute actions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostMuteResponse {
    pub action: Option<String>,
    pub hostname: Option<String>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Tags (v1)
// ---------------------------------------------------------------------------

/// Response from `GET /api/v1/tags/hosts`: tag -> hosts carrying it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllTagsResponse {
    pub tags: BTreeMap<String, Vec<String>>,
}

/// Response from tag reads/writes scoped to one host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostTagsResponse {
    pub host: Option<String>,
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Logs (v2)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSearchResponse {
    pub data: Vec<LogEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEvent {
    pub id: Option<String>,
    pub attributes: LogAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogAttributes {
    pub timestamp: Option<String>,
    pub status: Option<String>,
    pub service: Option<String>,
    pub host: Option<String>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Spans analytics (v2)
// ---------------------------------------------------------------------------

/// Response from `POST /api/v2/spans/analytics/aggregate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpansAggregateResponse {
    pub data: Option<SpansAggregateData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpansAggregateData {
    pub buckets: Vec<SpansBucket>,
}

/// One aggregation bucket: group-by facet values plus computed metrics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpansBucket {
    pub by: BTreeMap<String, String>,
    pub computes: BTreeMap<String, f64>,
}

impl SpansBucket {
    /// First compute value (`c0`), the only one the CLI requests.
    pub fn primary_compute(&self) -> f64 {
        self.computes.get("c0").copied().unwrap_or(0.0)
    }

    /// Group-by facet value, or `N/A` when the bucket is ungrouped.
    pub fn facet(&self, name: &str) -> &str {
        self.by.get(name).map(String::as_str).unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_parses_the_fields_the_tables_need() {
        let raw = r#"{
            "id": 123, "name": "cpu high", "type": "metric alert",
            "query": "avg(last_5m):avg:system.cpu.user{*} > 90",
            "overall_state": "Alert",
            "tags": ["env:prod", "team:core"],
            "unknown_future_field": {"nested": true}
        }"#;
        let monitor: Monitor = serde_json::from_str(raw).unwrap();
        assert_eq!(monitor.id, Some(123));
        assert_eq!(monitor.state(), "Alert");
        assert_eq!(monitor.monitor_type.as_deref(), Some("metric alert"));
        assert_eq!(monitor.tags.len(), 2);
    }

    #[test]
    fn monitor_state_defaults_to_unknown() {
        let monitor: Monitor = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(monitor.state(), "Unknown");
    }

    #[test]
    fn downtime_global_detection() {
        let global: Downtime =
            serde_json::from_str(r#"{"id": 1, "scope": ["*"], "disabled": false}"#).unwrap();
        assert!(global.is_global());
        let scoped: Downtime =
            serde_json::from_str(r#"{"id": 2, "scope": ["host:web-1"]}"#).unwrap();
        assert!(!scoped.is_global());
        let disabled: Downtime =
            serde_json::from_str(r#"{"id": 3, "scope": ["*"], "disabled": true}"#).unwrap();
        assert!(!disabled.is_global());
    }

    #[test]
    fn metric_series_skips_null_gap_points() {
        let raw = r#"{
            "metric": "system.cpu.user",
            "pointlist": [[1000.0, 1.5], [2000.0, null], [3000.0, 2.5], [4000.0, null]]
        }"#;
        let series: MetricSeries = serde_json::from_str(raw).unwrap();
        assert_eq!(series.last_value(), Some((3000.0, 2.5)));
    }

    #[test]
    fn spans_bucket_reads_compute_and_facet() {
        let raw = r#"{
            "by": {"resource_name": "GET /checkout"},
            "computes": {"c0": 812000000.0}
        }"#;
        let bucket: SpansBucket = serde_json::from_str(raw).unwrap();
        assert_eq!(bucket.primary_compute(), 812000000.0);
        assert_eq!(bucket.facet("resource_name"), "GET /checkout");
        assert_eq!(bucket.facet("service"), "N/A");
    }

    #[test]
    fn log_event_tolerates_sparse_attributes() {
        let raw = r#"{"id": "AQAA", "attributes": {"message": "boom"}}"#;
        let event: LogEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.attributes.message.as_deref(), Some("boom"));
        assert!(event.attributes.service.is_none());
    }
}
