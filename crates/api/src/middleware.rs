use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bridgecms_auth::JwtValidator;

use crate::app::errors::{ApiError, InternalErrorDetail, internal_error_with_detail};
use crate::config::RateLimitConfig;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// The token from an `Authorization: Bearer <token>` header, if present.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

// Expired windows are swept once the table grows past this many callers.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter keyed by caller IP.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `ip`; false once the window's budget is spent.
    pub fn check(&self, ip: IpAddr, now: Instant) -> bool {
        // A poisoned table still holds valid counters.
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() > PRUNE_THRESHOLD {
            let period = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < period);
        }

        let window = windows.entry(ip).or_insert(Window { count: 0, started: now });
        if now.duration_since(window.started) >= self.config.window {
            *window = Window { count: 0, started: now };
        }

        if window.count < self.config.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }
}

/// Caller IP: the peer address, else the first `X-Forwarded-For` entry.
fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Applies the limiter to `/api/*` requests.
pub async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, req: Request, next: Next) -> Response {
    if !req.uri().path().starts_with("/api/") {
        return next.run(req).await;
    }

    let ip = client_ip(&req);
    if !limiter.check(ip, Instant::now()) {
        tracing::warn!(%ip, window_secs = limiter.window().as_secs(), "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

/// Adds the internal error detail to 500 bodies. Installed in development only.
pub async fn expose_error_detail(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let detail = response
        .extensions()
        .get::<InternalErrorDetail>()
        .map(|InternalErrorDetail(detail)| detail.clone());
    match detail {
        Some(detail) => internal_error_with_detail(&detail),
        None => response,
    }
}
