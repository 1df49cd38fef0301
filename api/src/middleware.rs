//! Response hardening, CORS and per-client rate limiting
//!
//! All three are `axum::middleware::from_fn` layers.

use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

const SECURITY_HEADERS: [(&str, &str); 9] = [
    ("content-security-policy", "default-src 'self'"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-xss-protection", "0"),
];

const CORS_ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Add the standard hardening headers to every response
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    response
}

/// CORS policy with a single configured origin (or `*`)
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
}

impl CorsPolicy {
    /// Build the policy; an origin that is not a valid header value is rejected
    pub fn new(origin: &str) -> Result<Self, String> {
        let allow_origin = HeaderValue::from_str(origin)
            .map_err(|e| format!("Invalid CORS origin '{origin}': {e}"))?;
        Ok(Self { allow_origin })
    }

    pub fn allow_any() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
        }
    }

    fn is_wildcard(&self) -> bool {
        self.allow_origin.as_bytes() == b"*"
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        if !self.is_wildcard() {
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::allow_any()
    }
}

/// Answer preflight requests and tag every other response with CORS headers
pub async fn cors(State(policy): State<Arc<CorsPolicy>>, request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if is_preflight {
        let requested_headers = request
            .headers()
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned();

        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        policy.apply(headers);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOWED_METHODS),
        );
        if let Some(requested) = requested_headers {
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested);
            headers.append(
                header::VARY,
                HeaderValue::from_static("Access-Control-Request-Headers"),
            );
        }
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        return response;
    }

    let mut response = next.run(request).await;
    policy.apply(response.headers_mut());
    response
}

/// Outcome of one rate limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window resets
    pub reset_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started: Instant,
    hits: u32,
}

/// Fixed-window request counter keyed by client IP
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<IpAddr, ClientWindow>>,
}

impl RateLimiter {
    /// Stale windows are swept once this many clients are tracked
    const SWEEP_THRESHOLD: usize = 10_000;

    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `client` at `now`
    pub fn check(&self, client: IpAddr, now: Instant) -> RateDecision {
        let mut clients = self.clients.lock();

        if clients.len() >= Self::SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let entry = clients.entry(client).or_insert(ClientWindow {
            started: now,
            hits: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = ClientWindow {
                started: now,
                hits: 0,
            };
        }

        entry.hits = entry.hits.saturating_add(1);

        RateDecision {
            allowed: entry.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.hits),
            reset_after: self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started)),
        }
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

/// Peer address recorded by `into_make_service_with_connect_info`.
///
/// Without it every request falls back to `0.0.0.0` and all clients share
/// one window.
fn client_ip(request: &Request) -> IpAddr {
    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => addr.ip(),
        None => {
            debug!("No peer address on request, rate limiting under 0.0.0.0");
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        }
    }
}

/// Reject clients that exceed their budget with 429
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    let decision = limiter.check(client, Instant::now());

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(client = %client, limit = decision.limit, "Rate limit exceeded");
        ApiError::RateLimited.into_response()
    };

    let headers = response.headers_mut();
    headers.insert("ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "ratelimit-reset",
        HeaderValue::from(decision.reset_after.as_secs()),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_rate_limiter_allows_budget_then_rejects() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(client(1), now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let rejected = limiter.check(client(1), now);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
    }

    #[test]
    fn test_rate_limiter_counts_clients_separately() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(limiter.check(client(1), now).allowed);
        assert!(limiter.check(client(2), now).allowed);
        assert!(!limiter.check(client(1), now).allowed);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_rate_limiter_window_resets() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        let start = Instant::now();

        assert!(limiter.check(client(1), start).allowed);
        assert!(!limiter.check(client(1), start + Duration::from_secs(59)).allowed);

        let later = limiter.check(client(1), start + Duration::from_secs(60));
        assert!(later.allowed);
        assert_eq!(later.reset_after, Duration::from_secs(60));
    }

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut request = Request::new(axum::body::Body::empty());
        assert_eq!(client_ip(&request), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let peer: SocketAddr = "192.0.2.7:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&request), peer.ip());
    }

    #[test]
    fn test_cors_policy() {
        assert!(CorsPolicy::allow_any().is_wildcard());
        let specific = CorsPolicy::new("https://app.example.com").unwrap();
        assert!(!specific.is_wildcard());

        let mut headers = HeaderMap::new();
        specific.apply(&mut headers);
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(headers[header::VARY], "Origin");

        assert!(CorsPolicy::new("bad\norigin").is_err());
    }
}
