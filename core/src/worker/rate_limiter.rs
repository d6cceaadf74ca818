//! Request pacing via a token-bucket rate limiter

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::num::NonZeroU32;

/// Token-bucket pacing for request dispatch, built on the governor crate.
///
/// The dispatcher shares one instance across all workers via `Arc`, so the
/// configured rate bounds the whole run, not each worker individually.
pub struct RequestRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate: Option<f64>,
}

impl RequestRateLimiter {
    /// Create a new rate limiter.
    ///
    /// `rate` is in requests per second; `None` or a non-positive value
    /// disables pacing. Sub-1 RPS values are rounded up to 1 RPS.
    pub fn new(rate: Option<f64>) -> Self {
        let limiter = rate.and_then(|rps| {
            if rps <= 0.0 || !rps.is_finite() {
                return None;
            }
            let rps_int = (rps.ceil() as u32).max(1);
            let quota = Quota::per_second(NonZeroU32::new(rps_int)?);
            Some(RateLimiter::direct(quota))
        });

        Self {
            limiter,
            rate,
        }
    }

    /// Create an unbounded limiter (no pacing)
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Wait until the next request is allowed.
    ///
    /// Returns immediately when pacing is disabled.
    pub async fn wait(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Whether pacing is enabled
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// The configured rate in requests per second, if any
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for RequestRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRateLimiter")
            .field("rate", &self.rate)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
