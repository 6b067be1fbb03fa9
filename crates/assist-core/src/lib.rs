//! Core abstractions for the search assist client.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Language` - Supported result languages
//! - `SearchConfig` - Injected endpoint and credential configuration
//! - `SessionId` - Correlation identifier for a browsing session

mod config;
mod context;
mod language;

pub use config::*;
pub use context::*;
pub use language::*;
