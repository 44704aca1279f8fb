//! Fixed-window request rate limiting.
//!
//! The limiter is an injected component owned by the application state
//! rather than process-global, so it can be constructed with different
//! quotas per deployment (or per test) and swapped for a distributed
//! implementation if the service is ever scaled horizontally.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{ResponseError as _, web};

use crate::AppState;
use crate::error::ApiError;

/// Per-client window state.
struct WindowState {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window rate limiter keyed by client IP.
///
/// Each client gets `max_requests` per `window`; the window resets
/// `window` after the first request that opened it. State for a client
/// is created lazily on first sight.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, WindowState>>,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_requests` per `window` per
    /// client.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request from `client` and returns whether it is
    /// within quota.
    pub fn try_acquire(&self, client: &str) -> bool {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().expect("rate limiter mutex poisoned");

        let state = clients.entry(client.to_string()).or_insert(WindowState {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= state.reset_at {
            state.count = 0;
            state.reset_at = now + self.window;
        }

        if state.count >= self.max_requests {
            return false;
        }

        state.count += 1;
        true
    }
}

/// Middleware applying the injected [`RateLimiter`] to a scope.
///
/// Requests over quota are answered with `429 RATE_LIMIT_EXCEEDED` and
/// never reach a handler, so they have no side effects.
pub async fn rate_limit_middleware<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error>
where
    B: MessageBody + 'static,
{
    let allowed = req.app_data::<web::Data<AppState>>().is_none_or(|state| {
        let client = req
            .peer_addr()
            .map_or_else(|| "unknown".to_string(), |addr| addr.ip().to_string());
        state.rate_limiter.try_acquire(&client)
    });

    if allowed {
        Ok(next.call(req).await?.map_into_left_body())
    } else {
        let response = ApiError::RateLimitExceeded.error_response();
        Ok(req.into_response(response).map_into_right_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn allows_up_to_the_quota() {
        let limiter = RateLimiter::new(3, WINDOW);
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(!limiter.try_acquire("10.0.0.1"));
    }

    #[test]
    fn tracks_clients_independently() {
        let limiter = RateLimiter::new(1, WINDOW);
        assert!(limiter.try_acquire("10.0.0.1"));
        assert!(!limiter.try_acquire("10.0.0.1"));
        assert!(limiter.try_acquire("10.0.0.2"));
    }

    #[test]
    fn window_expiry_resets_the_quota() {
        let limiter = RateLimiter::new(1, WINDOW);
        let start = Instant::now();

        assert!(limiter.try_acquire_at("10.0.0.1", start));
        assert!(!limiter.try_acquire_at("10.0.0.1", start + Duration::from_secs(59)));
        assert!(limiter.try_acquire_at("10.0.0.1", start + Duration::from_secs(61)));
        assert!(!limiter.try_acquire_at("10.0.0.1", start + Duration::from_secs(62)));
    }
}
