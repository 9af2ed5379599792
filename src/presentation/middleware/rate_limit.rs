use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::presentation::config::RateLimitSettings;
use crate::presentation::error::ApiError;

const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
/// Expired windows are first swept once this many clients are tracked.
const SWEEP_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    trust_forwarded_for: bool,
    clients: Mutex<Clients>,
}

struct Clients {
    windows: HashMap<String, Window>,
    sweep_at: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            trust_forwarded_for: false,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                sweep_at: SWEEP_THRESHOLD,
            }),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.window_secs),
            settings.max_requests,
        )
        .trust_forwarded_for(settings.trust_forwarded_for)
    }

    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub async fn check(&self, client: &str, now: Instant) -> Decision {
        let mut clients = self.clients.lock().await;

        // next sweep waits until the surviving set has doubled
        if clients.windows.len() >= clients.sweep_at {
            let window = self.window;
            clients
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            clients.sweep_at = (clients.windows.len() * 2).max(SWEEP_THRESHOLD);
        }

        let entry = clients
            .windows
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    /// Socket address by default; the forwarded header only when trusted.
    fn client_key(&self, request: &Request) -> String {
        let forwarded = self
            .trust_forwarded_for
            .then(|| {
                request
                    .headers()
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .flatten();

        forwarded
            .or_else(|| {
                request
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = limiter.client_key(&request);

    match limiter.check(&client, Instant::now()).await {
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %client, "Rate limit exceeded");
            ApiError::rate_limited(retry_after.as_secs().max(1)).into_response()
        }
        Decision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                RATE_LIMIT_LIMIT_HEADER,
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));
            response
        }
    }
}
