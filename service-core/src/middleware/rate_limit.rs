use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;

/// Proxy headers consulted for the client address, in order of trust.
pub const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Key used when no address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiter keyed by client IP
pub type IpRateLimiter = Arc<FixedWindowLimiter>;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter.
///
/// The first request for a key (or the first after its window expired) opens a
/// new window with a count of one. Every further request inside the window
/// increments the count and is refused once the count exceeds `max_requests`.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            entries: DashMap::new(),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request for `key`. Returns the time left in the window when refused.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            started: now,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if entry.count == 0 || elapsed > self.window {
            *entry = WindowEntry {
                count: 1,
                started: now,
            };
            return Ok(());
        }

        entry.count += 1;
        if entry.count > self.max_requests {
            return Err(self.window.saturating_sub(elapsed));
        }

        Ok(())
    }

    /// Drop every key whose window has expired. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.started) <= self.window);
        before - self.entries.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

/// Create a keyed rate limiter (by IP)
pub fn create_ip_rate_limiter(max_requests: u32, window_seconds: u64) -> IpRateLimiter {
    Arc::new(FixedWindowLimiter::new(
        max_requests,
        Duration::from_secs(window_seconds.max(1)),
    ))
}

/// Periodically purge expired windows so idle clients do not accumulate.
pub fn spawn_purge_task(limiter: IpRateLimiter) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window().max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let removed = limiter.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "Purged expired rate limit windows");
            }
        }
    })
}

/// Best-effort client address: proxy headers first, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Resolve the client address for a request, falling back to [`UNKNOWN_CLIENT`].
pub fn request_client_ip(request: &Request) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    client_ip(request.headers(), peer).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Client-facing refusal text naming the configured limit.
pub fn limit_message(limiter: &FixedWindowLimiter) -> String {
    format!(
        "Terlalu banyak permintaan. Maks {} request per {} detik.",
        limiter.max_requests(),
        limiter.window().as_secs()
    )
}

/// Middleware for IP-based rate limiting
pub async fn ip_rate_limit_middleware(
    State(limiter): State<IpRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = request_client_ip(&request);

    match limiter.check(&ip) {
        Ok(()) => Ok(next.run(request).await),
        Err(wait_time) => {
            tracing::warn!(client_ip = %ip, "Rate limit exceeded");
            Err(AppError::TooManyRequests(
                limit_message(&limiter),
                Some(wait_time.as_secs().max(1)),
            ))
        }
    }
}
