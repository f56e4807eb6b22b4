//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. The API allows
//! 100 calls per rolling 10-second window; an exhausted budget blocks the
//! caller instead of failing the request.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of calls per window
    pub max_calls: u32,
    /// Length of the rolling window
    pub period: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_calls: 100,
            period: Duration::from_secs(10),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(max_calls: u32, period: Duration) -> Self {
        Self { max_calls, period }
    }
}

/// Token bucket rate limiter shared by all requests
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let max_calls = NonZeroU32::new(config.max_calls).unwrap_or(NonZeroU32::new(1).unwrap());
        // one token every period / max_calls, with the full window as burst
        let quota = Quota::with_period(config.period / max_calls.get())
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).unwrap()))
            .allow_burst(max_calls);

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a call can be made (blocks)
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}
