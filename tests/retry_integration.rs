//! End-to-end retry behavior: executor wrapped around the real client,
//! against a local mock server.

use dogctl::api::{execute, DatadogClient, RetryPolicy};
use dogctl::config::Config;
use dogctl::error::FailureCategory;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn test_config() -> Config {
    Config {
        api_key: "test-api-key".to_string(),
        app_key: "test-app-key".to_string(),
        ..Config::default()
    }
}

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        backoff_multiplier: 2.0,
    }
}

fn json_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve the given responses to sequential connections, returning the number
/// of requests actually seen.
async fn sequential_server(
    responses: Vec<String>,
) -> (String, tokio::task::JoinHandle<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut served = 0;
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 8192];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(response.as_bytes()).await;
            served += 1;
        }
        served
    });
    (format!("http://{addr}"), handle)
}

#[tokio::test]
async fn server_errors_are_retried_until_recovery() {
    let monitor_body = r#"{"id": 7, "name": "cpu high", "overall_state": "OK"}"#;
    let (base_url, handle) = sequential_server(vec![
        json_response("503 Service Unavailable", r#"{"errors":["down"]}"#),
        json_response("500 Internal Server Error", r#"{"errors":["down"]}"#),
        json_response("200 OK", monitor_body),
    ])
    .await;

    let client = DatadogClient::with_base_url(&test_config(), base_url);
    let monitor = execute(|| client.get_monitor(7), &quick_policy(3))
        .await
        .expect("third attempt should succeed");

    assert_eq!(monitor.id, Some(7));
    assert_eq!(handle.await.unwrap(), 3);
}

#[tokio::test]
async fn auth_failures_stop_after_one_request() {
    let (base_url, handle) = sequential_server(vec![json_response(
        "401 Unauthorized",
        r#"{"errors":["bad creds"]}"#,
    )])
    .await;

    let client = DatadogClient::with_base_url(&test_config(), base_url);
    let failure = execute(|| client.list_monitors(None), &quick_policy(5))
        .await
        .expect_err("401 must fail immediately");

    assert_eq!(failure.category, FailureCategory::Auth);
    assert_eq!(failure.http_status, Some(401));
    assert_eq!(failure.category.exit_code(), 2);
    assert_eq!(handle.await.unwrap(), 1);
}

#[tokio::test]
async fn rate_limit_with_hint_recovers_on_retry() {
    let throttled_body = r#"{"errors":["slow"]}"#;
    let throttled = format!(
        "HTTP/1.1 429 Too Many Requests\r\nContent-Type: application/json\r\nRetry-After: 0\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{throttled_body}",
        throttled_body.len()
    );
    let (base_url, handle) =
        sequential_server(vec![throttled, json_response("200 OK", "[]")]).await;

    let client = DatadogClient::with_base_url(&test_config(), base_url);
    let downtimes = execute(|| client.list_downtimes(), &quick_policy(2))
        .await
        .expect("retry after hint should recover");

    assert!(downtimes.is_empty());
    assert_eq!(handle.await.unwrap(), 2);
}

#[tokio::test]
async fn connection_refused_classifies_as_transport() {
    // Bind then drop the listener so the port refuses connections.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DatadogClient::with_base_url(&test_config(), format!("http://{addr}"));
    let failure = execute(|| client.host_totals(), &quick_policy(2))
        .await
        .expect_err("nothing is listening");

    assert_eq!(failure.category, FailureCategory::Transport);
    assert!(failure.http_status.is_none());
    assert_eq!(failure.category.exit_code(), 1);
}
