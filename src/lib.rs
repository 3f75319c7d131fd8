//! Tollgate - Token Bucket Rate Limiting
//!
//! This crate implements a single-process rate limiter based on the token
//! bucket algorithm. A [`TokenBucket`](ratelimit::TokenBucket) holds a
//! continuously replenishing pool of tokens and decides, for each request,
//! whether the caller may proceed. Decisions are atomic under concurrent
//! access, so callers sharing one bucket can never oversubscribe it.

pub mod config;
pub mod demo;
pub mod error;
pub mod ratelimit;

pub use error::{Result, TollgateError};
pub use ratelimit::TokenBucket;
