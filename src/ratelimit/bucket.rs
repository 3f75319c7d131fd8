//! Token bucket implementation.

use parking_lot::Mutex;
use std::time::Instant;
use tracing::debug;

use super::clock::{Clock, MonotonicClock};
use crate::config::BucketConfig;
use crate::error::{Result, TollgateError};

/// A thread-safe token bucket.
///
/// Tokens accrue continuously at `rate` per second up to `capacity`. Every
/// call to [`decide`](TokenBucket::decide) refills the bucket for the time
/// elapsed since the previous call and then admits the request if at least
/// one whole token is available, consuming it.
///
/// The bucket starts full. Share it between threads with `Arc<TokenBucket>`.
#[derive(Debug)]
pub struct TokenBucket<C: Clock = MonotonicClock> {
    /// Tokens added per second
    rate: f64,
    /// Maximum number of tokens held
    capacity: f64,
    /// Token level and refill timestamp, always updated together
    state: Mutex<BucketState>,
    clock: C,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    /// Level the bucket would hold at `now`. Negative intervals count as zero.
    fn projected(&self, now: Instant, rate: f64, capacity: f64) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * rate).min(capacity)
    }
}

impl TokenBucket {
    /// Create a full bucket driven by the monotonic clock.
    pub fn new(rate: f64, capacity: f64) -> Result<Self> {
        Self::with_clock(rate, capacity, MonotonicClock)
    }

    /// Create a bucket from configuration values.
    pub fn from_config(config: &BucketConfig) -> Result<Self> {
        Self::new(config.rate, config.capacity)
    }
}

impl<C: Clock> TokenBucket<C> {
    /// Create a full bucket that samples time from `clock`.
    ///
    /// Fails with [`TollgateError::InvalidConfiguration`] unless both `rate`
    /// and `capacity` are finite and greater than zero.
    pub fn with_clock(rate: f64, capacity: f64, clock: C) -> Result<Self> {
        if !is_positive(rate) || !is_positive(capacity) {
            return Err(TollgateError::InvalidConfiguration { rate, capacity });
        }

        debug!(rate, capacity, "Creating token bucket");

        let last_refill = clock.now();
        Ok(Self {
            rate,
            capacity,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill,
            }),
            clock,
        })
    }

    /// Decide whether a request may proceed.
    ///
    /// Returns `true` and consumes one token if the refilled level is at least
    /// one; otherwise returns `false` and leaves the level untouched.
    pub fn decide(&self) -> bool {
        let mut state = self.state.lock();

        // One sample serves both the elapsed computation and the new timestamp.
        let now = self.clock.now();
        state.tokens = state.projected(now, self.rate, self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens that would be available to a request arriving now.
    ///
    /// This does not commit the refill or consume anything.
    pub fn available_tokens(&self) -> f64 {
        let state = self.state.lock();
        state.projected(self.clock.now(), self.rate, self.capacity)
    }

    /// Tokens added per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum number of tokens the bucket holds.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
