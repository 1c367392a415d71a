//! Fixed-window request limiter, keyed by client address.
//!
//! Client identity is the peer IP from `ConnectInfo`. The first `X-Forwarded-For`
//! entry is used instead only when `TRUST_PROXY` is on, since clients can set that
//! header freely. Requests with no known peer share the `anonymous` bucket.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimit;
use crate::errors::AppError;
use crate::state::AppState;

const ANONYMOUS_CLIENT: &str = "anonymous";

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    quota: RateLimit,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(quota: RateLimit) -> Self {
        Self {
            quota,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `client`; returns false when its quota is spent.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Forget expired windows so the map does not grow without bound.
        let period = self.quota.period;
        windows.retain(|_, w| now.duration_since(w.started) < period);

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if window.count >= self.quota.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = identify_client(&req, state.config.trust_proxy);

    if state.rate_limiter.check(&client) {
        next.run(req).await
    } else {
        tracing::warn!(client = %client, "rate limit exceeded");
        AppError::RateLimited.into_response()
    }
}

fn identify_client(req: &Request<Body>, trust_proxy: bool) -> String {
    let forwarded = if trust_proxy { forwarded_for(req) } else { None };

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

/// First address in `X-Forwarded-For`, if any.
fn forwarded_for(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
