//! Structured request logging middleware for the HTTP server
//!
//! Emits one tracing event per `/api` request with method, path, status and
//! latency. Query strings are truncated and sensitive keys redacted.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Maximum length for a logged query string before truncation
const MAX_QUERY_LENGTH: usize = 60;

/// Truncation suffix for long values
const TRUNCATION_SUFFIX: &str = "...";

/// Request logging middleware
///
/// Server errors are logged at `error`, client errors at `warn`, the rest
/// at `info`.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if !path.starts_with("/api") {
        return next.run(request).await;
    }

    let start_time = Instant::now();
    let method = request.method().clone();
    let query = request
        .uri()
        .query()
        .map(format_query_summary)
        .unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = start_time.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        error!(%method, %path, %query, status, latency_ms, "request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, %query, status, latency_ms, "request rejected");
    } else {
        info!(%method, %path, %query, status, latency_ms, "request completed");
    }

    response
}

/// Redact sensitive pairs, then truncate the whole query string
fn format_query_summary(query: &str) -> String {
    let redacted: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_parameter(key) => format!("{key}=[REDACTED]"),
            _ => pair.to_string(),
        })
        .collect();

    truncate_string(&redacted.join("&"), MAX_QUERY_LENGTH)
}

/// Truncate string to max length with suffix, respecting char boundaries
fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let truncated_length = max_length.saturating_sub(TRUNCATION_SUFFIX.len());
        let truncated: String = input.chars().take(truncated_length).collect();
        format!("{truncated}{TRUNCATION_SUFFIX}")
    }
}

/// Check if parameter should be redacted
fn is_sensitive_parameter(key: &str) -> bool {
    let sensitive_keys = [
        "password", "token", "secret", "key", "auth", "credential",
    ];

    let key_lower = key.to_lowercase();
    sensitive_keys.iter().any(|&sensitive| key_lower.contains(sensitive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("this is a very long string", 10), "this is...");
        assert_eq!(truncate_string("exactly10c", 10), "exactly10c");
        assert_eq!(truncate_string("ééééééééééé", 10), "ééééééé...");
    }

    #[test]
    fn test_format_query_summary() {
        assert_eq!(
            format_query_summary("status=pending&page=2"),
            "status=pending&page=2"
        );
        assert_eq!(
            format_query_summary("api_key=abc&limit=5"),
            "api_key=[REDACTED]&limit=5"
        );
    }

    #[test]
    fn test_is_sensitive_parameter() {
        assert!(is_sensitive_parameter("password"));
        assert!(is_sensitive_parameter("api_key"));
        assert!(is_sensitive_parameter("AUTH_TOKEN"));
        assert!(!is_sensitive_parameter("status"));
        assert!(!is_sensitive_parameter("priority"));
    }
}
