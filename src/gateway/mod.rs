//! Polling boundary: rate limiting and client-side snapshot reconciliation.

mod poll;
mod rate_limit;

pub use poll::{ClientAction, PollWatcher, Snapshot};
pub use rate_limit::{RateLimiter, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS};
