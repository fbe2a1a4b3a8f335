//! HTTP probing of concrete URLs
//!
//! This module issues the requests: single probes with cookie, TLS and
//! redirect handling, chunked batch runs with progress, rate limiting,
//! and session cookie retrieval.

pub mod batch;
pub mod cookie;
pub mod probe;
pub mod rate_limit;
pub mod session;

// Re-export commonly used items
pub use batch::{BatchRunner, BatchSummary, CancelFlag};
pub use cookie::SessionCookie;
pub use probe::{ProbeOutcome, ProbeUrl, Prober, TransportSettings};
pub use rate_limit::RateLimiter;
pub use session::{login_url, session_cookies};
