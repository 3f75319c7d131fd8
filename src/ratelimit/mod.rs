//! Token bucket rate limiting.

mod bucket;
mod clock;

pub use bucket::TokenBucket;
pub use clock::{Clock, ManualClock, MonotonicClock};
