//! Per-email rate limiting
//!
//! Caps how often one address may request a credential, so the gateway
//! cannot be used as a domain-enumeration oracle.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;

/// Rate limit config
#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 5,
            burst: 5,
        }
    }
}

/// Per-email token-bucket limiter
pub struct EmailRateLimiter {
    buckets: RwLock<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

impl EmailRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Whether this address may make another issuance request now.
    pub fn allow(&self, email: &str) -> bool {
        let mut buckets = self.buckets.write();
        let bucket = buckets
            .entry(email.to_lowercase())
            .or_insert_with(|| TokenBucket::new(self.config));
        bucket.try_acquire()
    }
}

/// Token bucket
struct TokenBucket {
    available: f64,
    max: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            available: config.burst as f64,
            max: config.burst as f64,
            refill_per_sec: config.requests_per_minute as f64 / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.available >= 1.0 {
            self.available -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.available = (self.available + elapsed * self.refill_per_sec).min(self.max);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_honored_then_exhausted() {
        let limiter = EmailRateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst: 3,
        });

        for _ in 0..3 {
            assert!(limiter.allow("probe@example.com"));
        }
        assert!(!limiter.allow("probe@example.com"));
    }

    #[test]
    fn addresses_are_limited_independently() {
        let limiter = EmailRateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst: 1,
        });

        assert!(limiter.allow("a@example.com"));
        assert!(!limiter.allow("a@example.com"));
        assert!(limiter.allow("b@example.com"));
    }

    #[test]
    fn limiting_ignores_address_case() {
        let limiter = EmailRateLimiter::new(RateLimitConfig {
            requests_per_minute: 1,
            burst: 1,
        });

        assert!(limiter.allow("Probe@Example.com"));
        assert!(!limiter.allow("probe@example.com"));
    }
}
