//! Unified Datadog API client.
//!
//! One method per endpoint the CLI touches. Every method performs exactly one
//! HTTP request and reports failure as a raw [`ApiError`]; retry and
//! classification live in [`crate::api::executor`], which call sites wrap
//! around these methods.

use crate::api::types::{
    ActiveMetricsResponse, AllTagsResponse, Downtime, EventListResponse, EventPostResponse,
    HostListResponse, HostMuteResponse, HostTagsResponse, HostTotals, LogSearchResponse,
    Monitor, MonitorValidation, SpansAggregateResponse,
};
use crate::config::Config;
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// Client over the Datadog v1/v2 REST APIs.
pub struct DatadogClient {
    http: reqwest::Client,
    base_url: String,
}

impl DatadogClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            config,
            format!("https://api.{}", config.site.trim_end_matches('/')),
        )
    }

    /// Build a client against an explicit base URL. Tests point this at a
    /// local mock server.
    pub fn with_base_url(config: &Config, base_url: String) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(config.api_key.trim()) {
            headers.insert("DD-API-KEY", value);
        }
        if let Ok(value) = HeaderValue::from_str(config.app_key.trim()) {
            headers.insert("DD-APPLICATION-KEY", value);
        }

        // Fall back to reqwest defaults if builder creation fails for any reason.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // -- monitors (v1) ------------------------------------------------------

    pub async fn list_monitors(&self, tags: Option<&str>) -> Result<Vec<Monitor>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(tags) = tags {
            query.push(("monitor_tags", tags.to_string()));
        }
        self.request(Method::GET, "/api/v1/monitor", &query, None)
            .await
    }

    pub async fn get_monitor(&self, id: i64) -> Result<Monitor, ApiError> {
        self.request(Method::GET, &format!("/api/v1/monitor/{id}"), &[], None)
            .await
    }

    pub async fn create_monitor(&self, body: &Value) -> Result<Monitor, ApiError> {
        self.request(Method::POST, "/api/v1/monitor", &[], Some(body))
            .await
    }

    pub async fn update_monitor(&self, id: i64, body: &Value) -> Result<Monitor, ApiError> {
        self.request(
            Method::PUT,
            &format!("/api/v1/monitor/{id}"),
            &[],
            Some(body),
        )
        .await
    }

    pub async fn delete_monitor(&self, id: i64) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &format!("/api/v1/monitor/{id}"), &[], None)
            .await
    }

    pub async fn validate_monitor(&self, body: &Value) -> Result<MonitorValidation, ApiError> {
        self.request(Method::POST, "/api/v1/monitor/validate", &[], Some(body))
            .await
    }

    // -- downtimes (v1) -----------------------------------------------------

    pub async fn list_downtimes(&self) -> Result<Vec<Downtime>, ApiError> {
        self.request(Method::GET, "/api/v1/downtime", &[], None).await
    }

    pub async fn create_downtime(&self, body: &Value) -> Result<Downtime, ApiError> {
        self.request(Method::POST, "/api/v1/downtime", &[], Some(body))
            .await
    }

    pub async fn cancel_downtime(&self, id: i64) -> Result<(), ApiError> {
        self.request_no_content(Method::DELETE, &format!("/api/v1/downtime/{id}"))
            .await
    }

    // -- metrics (v1) -------------------------------------------------------

    pub async fn query_metrics(
        &self,
        query: &str,
        from: i64,
        to: i64,
    ) -> Result<crate::api::types::MetricQueryResponse, ApiError> {
        let params = [
            ("query", query.to_string()),
            ("from", from.to_string()),
            ("to", to.to_string()),
        ];
        self.request(Method::GET, "/api/v1/query", &params, None)
            .await
    }

    pub async fn list_active_metrics(&self, from: i64) -> Result<ActiveMetricsResponse, ApiError> {
        let params = [("from", from.to_string())];
        self.request(Method::GET, "/api/v1/metrics", &params, None)
            .await
    }

    // -- events (v1) --------------------------------------------------------

    pub async fn list_events(
        &self,
        start: i64,
        end: i64,
        priority: Option<&str>,
        tags: Option<&str>,
    ) -> Result<EventListResponse, ApiError> {
        let mut params = vec![("start", start.to_string()), ("end", end.to_string())];
        if let Some(priority) = priority {
            params.push(("priority", priority.to_string()));
        }
        if let Some(tags) = tags {
            params.push(("tags", tags.to_string()));
        }
        self.request(Method::GET, "/api/v1/events", &params, None)
            .await
    }

    pub async fn post_event(&self, body: &Value) -> Result<EventPostResponse, ApiError> {
        self.request(Method::POST, "/api/v1/events", &[], Some(body))
            .await
    }

    // -- hosts (v1) ---------------------------------------------------------

    pub async fn list_hosts(
        &self,
        filter: Option<&str>,
        count: u32,
    ) -> Result<HostListResponse, ApiError> {
        let mut params = vec![("count", count.to_string())];
        if let Some(filter) = filter {
            params.push(("filter", filter.to_string()));
        }
        self.request(Method::GET, "/api/v1/hosts", &params, None)
            .await
    }

    pub async fn host_totals(&self) -> Result<HostTotals, ApiError> {
        self.request(Method::GET, "/api/v1/hosts/totals", &[], None)
            .await
    }

    pub async fn mute_host(
        &self,
        hostname: &str,
        body: &Value,
    ) -> Result<HostMuteResponse, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/v1/host/{hostname}/mute"),
            &[],
            Some(body),
        )
        .await
    }

    pub async fn unmute_host(&self, hostname: &str) -> Result<HostMuteResponse, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/v1/host/{hostname}/unmute"),
            &[],
            None,
        )
        .await
    }

    // -- tags (v1) ----------------------------------------------------------

    pub async fn list_all_tags(&self) -> Result<AllTagsResponse, ApiError> {
        self.request(Method::GET, "/api/v1/tags/hosts", &[], None)
            .await
    }

    pub async fn host_tags(&self, hostname: &str) -> Result<HostTagsResponse, ApiError> {
        self.request(
            Method::GET,
            &format!("/api/v1/tags/hosts/{hostname}"),
            &[],
            None,
        )
        .await
    }

    pub async fn add_host_tags(
        &self,
        hostname: &str,
        tags: &[String],
    ) -> Result<HostTagsResponse, ApiError> {
        let body = serde_json::json!({ "tags": tags });
        self.request(
            Method::POST,
            &format!("/api/v1/tags/hosts/{hostname}"),
            &[],
            Some(&body),
        )
        .await
    }

    // -- logs (v2) ----------------------------------------------------------

    pub async fn search_logs(&self, body: &Value) -> Result<LogSearchResponse, ApiError> {
        self.request(Method::POST, "/api/v2/logs/events/search", &[], Some(body))
            .await
    }

    // -- spans analytics (v2) -----------------------------------------------

    pub async fn aggregate_spans(&self, body: &Value) -> Result<SpansAggregateResponse, ApiError> {
        self.request(
            Method::POST,
            "/api/v2/spans/analytics/aggregate",
            &[],
            Some(body),
        )
        .await
    }

    // -- shared dispatch ----------------------------------------------------

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "dispatching API request");

        let mut req = self.http.request(method, &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, body, retry_after_secs));
        }

        response.json::<T>().await.map_err(ApiError::from)
    }

    /// Dispatch a request whose success response carries no body (204).
    async fn request_no_content(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "dispatching API request");

        let response = self.http.request(method, &url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after_secs = parse_retry_after_secs(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(status, body, retry_after_secs));
        }
        Ok(())
    }
}

/// Extract a `Retry-After` hint in seconds from response headers.
///
/// Accepts both the delta-seconds and HTTP-date forms; an HTTP date in the
/// past yields zero rather than a negative wait.
pub fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let raw = headers.get("retry-after")?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(seconds);
    }
    let when = httpdate::parse_http_date(raw).ok()?;
    match when.duration_since(SystemTime::now()) {
        Ok(delta) => Some(delta.as_secs()),
        Err(_) => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config() -> Config {
        Config {
            api_key: "test-api-key".to_string(),
            app_key: "test-app-key".to_string(),
            ..Config::default()
        }
    }

    /// Serve one canned HTTP response, returning the raw request bytes.
    async fn one_shot_server(
        response: String,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let request = read_http_request(&mut stream).await;
            let _ = stream.write_all(response.as_bytes()).await;
            request
        });
        (format!("http://{addr}"), handle)
    }

    /// Read one HTTP request: headers, then the body its Content-Length
    /// announces.
    async fn read_http_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut collected: Vec<u8> = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let Ok(n) = stream.read(&mut buf).await else {
                break;
            };
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&collected);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let body_len = text
                .lines()
                .find_map(|line| line.to_ascii_lowercase().strip_prefix("content-length:")
                    .and_then(|v| v.trim().parse::<usize>().ok()))
                .unwrap_or(0);
            if collected.len() >= header_end + 4 + body_len {
                break;
            }
        }
        String::from_utf8_lossy(&collected).into_owned()
    }

    fn json_response(status_line: &str, body: &str, extra_headers: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n{extra_headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn auth_headers_travel_with_every_request() {
        let (base_url, handle) =
            one_shot_server(json_response("200 OK", "[]", "")).await;
        let client = DatadogClient::with_base_url(&test_config(), base_url);
        let monitors = client.list_monitors(None).await.expect("list");
        assert!(monitors.is_empty());

        let request = handle.await.unwrap();
        assert!(request.contains("dd-api-key: test-api-key"));
        assert!(request.contains("dd-application-key: test-app-key"));
        assert!(request.starts_with("GET /api/v1/monitor"));
    }

    #[tokio::test]
    async fn non_2xx_becomes_status_error_with_body() {
        let (base_url, _handle) = one_shot_server(json_response(
            "403 Forbidden",
            r#"{"errors":["Forbidden"]}"#,
            "",
        ))
        .await;
        let client = DatadogClient::with_base_url(&test_config(), base_url);
        let err = client.get_monitor(42).await.expect_err("should fail");
        match err {
            ApiError::Status { code, body, .. } => {
                assert_eq!(code, 403);
                assert!(body.contains("Forbidden"));
            }
            other => panic!("expected status error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn retry_after_header_is_surfaced() {
        let (base_url, _handle) = one_shot_server(json_response(
            "429 Too Many Requests",
            r#"{"errors":["rate"]}"#,
            "Retry-After: 9\r\n",
        ))
        .await;
        let client = DatadogClient::with_base_url(&test_config(), base_url);
        let err = client.list_downtimes().await.expect_err("should fail");
        match err {
            ApiError::Status {
                code,
                retry_after_secs,
                ..
            } => {
                assert_eq!(code, 429);
                assert_eq!(retry_after_secs, Some(9));
            }
            other => panic!("expected status error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn tag_add_posts_json_body() {
        let (base_url, handle) = one_shot_server(json_response(
            "201 Created",
            r#"{"host":"web-1","tags":["env:prod"]}"#,
            "",
        ))
        .await;
        let client = DatadogClient::with_base_url(&test_config(), base_url);
        let tags = vec!["env:prod".to_string()];
        let response = client.add_host_tags("web-1", &tags).await.expect("add");
        assert_eq!(response.tags, ["env:prod"]);

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /api/v1/tags/hosts/web-1"));
        assert!(request.contains(r#"{"tags":["env:prod"]}"#));
    }

    #[tokio::test]
    async fn cancel_downtime_accepts_an_empty_body() {
        let response =
            "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string();
        let (base_url, _handle) = one_shot_server(response).await;
        let client = DatadogClient::with_base_url(&test_config(), base_url);
        client.cancel_downtime(77).await.expect("cancel");
    }

    #[test]
    fn retry_after_parses_delta_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after_secs(&headers), Some(30));
    }

    #[test]
    fn retry_after_http_date_in_the_past_saturates_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after_secs(&headers), Some(0));
    }

    #[test]
    fn retry_after_garbage_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("soon"));
        assert_eq!(parse_retry_after_secs(&headers), None);
    }
}
