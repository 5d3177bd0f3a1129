//! Fixed-window request rate limiting, keyed by forwarded client IP.
//!
//! The layer wraps the router outside the auth middleware, so requests
//! are keyed before any identity is established. State lives in process
//! memory, which is sufficient for a single-instance deployment.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::Request, http::StatusCode, response::Response};
use dashmap::DashMap;
use futures::future::BoxFuture;
use metrics::counter;
use tracing::{debug, warn};

/// Converts a numeric value to a header value. Numeric strings are
/// always valid ASCII, so the fallback never fires in practice.
fn num_to_header_value<T: ToString>(n: T) -> http::HeaderValue {
    http::HeaderValue::from_str(&n.to_string())
        .unwrap_or_else(|_| http::HeaderValue::from_static("0"))
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitEntry {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }

    fn observe(&mut self, window_duration: Duration) -> u32 {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= window_duration {
            self.count = 1;
            self.window_start = now;
        } else {
            self.count += 1;
        }
        self.count
    }

    fn time_until_reset(&self, window_duration: Duration) -> Duration {
        window_duration.saturating_sub(self.window_start.elapsed())
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_window: u32,
    pub window_duration: Duration,
    pub enable_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
            enable_headers: true,
        }
    }
}

#[derive(Debug)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: Duration,
}

#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn check_rate_limit(&self, key: &str) -> RateLimitResult {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(RateLimitEntry::new);

        let count = entry.observe(self.config.window_duration);
        let reset_time = entry.time_until_reset(self.config.window_duration);

        RateLimitResult {
            allowed: count <= self.config.requests_per_window,
            limit: self.config.requests_per_window,
            remaining: self.config.requests_per_window.saturating_sub(count),
            reset_time,
        }
    }

    /// Drops entries whose window has elapsed. Called periodically from
    /// a background task.
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < self.config.window_duration);
    }
}

/// Picks the rate limit key for a request: forwarded client IP first,
/// then a shared anonymous bucket.
fn extract_key(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                return format!("ip:{}", ip.trim());
            }
        }
    }

    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return format!("ip:{}", ip_str);
        }
    }

    "ip:unknown".to_string()
}

fn apply_headers(response: &mut Response, result: &RateLimitResult) {
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", num_to_header_value(result.limit));
    headers.insert("X-RateLimit-Remaining", num_to_header_value(result.remaining));
    headers.insert(
        "X-RateLimit-Reset",
        num_to_header_value(result.reset_time.as_secs()),
    );
}

#[derive(Clone)]
pub struct RateLimitLayer {
    rate_limiter: RateLimiter,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            rate_limiter: RateLimiter::new(config),
        }
    }

    /// Handle to the shared limiter, for the cleanup task.
    pub fn limiter(&self) -> RateLimiter {
        self.rate_limiter.clone()
    }
}

impl<S> tower::Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    rate_limiter: RateLimiter,
}

impl<S> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let rate_limiter = self.rate_limiter.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = request.uri().path().to_string();
            if path.starts_with("/health") || path.starts_with("/docs") || path.starts_with("/api-docs") {
                return inner.call(request).await;
            }

            let key = extract_key(&request);
            let result = rate_limiter.check_rate_limit(&key);

            if !result.allowed {
                warn!(%key, %path, "rate limit exceeded");
                counter!("autoshop_rate_limit_denied_total", 1);

                let mut response = Response::new(axum::body::Body::from("rate limit exceeded"));
                *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
                if rate_limiter.config.enable_headers {
                    apply_headers(&mut response, &result);
                }
                return Ok(response);
            }

            let mut response = inner.call(request).await?;
            if rate_limiter.config.enable_headers {
                apply_headers(&mut response, &result);
            }
            Ok(response)
        })
    }
}

pub async fn start_cleanup_task(rate_limiter: RateLimiter, interval: Duration) {
    let mut interval_timer = tokio::time::interval(interval);
    loop {
        interval_timer.tick().await;
        rate_limiter.cleanup_expired();
        debug!("rate limiter cleanup completed");
    }
}
