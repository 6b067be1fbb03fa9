//! Observability for the search assist client.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with session context
//! - `FetchMetrics` / `SessionMetrics` - Per-fetch timings and session counters

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export SessionId from assist-core for convenience
pub use assist_core::SessionId;
