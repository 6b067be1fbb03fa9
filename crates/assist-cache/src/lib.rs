//! Response caching for the search assist client.
//!
//! This crate provides:
//! - `QueryKey` - Identity of a fetchable search request
//! - `FetchCache` - Keyed result cache with in-flight deduplication
//!
//! Resolved entries are immutable: a lookup never revalidates a hit on its
//! own. Callers force a fresh fetch by asking for revalidation explicitly.
//!
//! # Example
//!
//! ```ignore
//! use assist_cache::{FetchCache, QueryKey};
//!
//! let cache: FetchCache<DisplayModel, SearchError> = FetchCache::new(256);
//! let key = QueryKey::new(&config.endpoint, &state);
//! let (result, status) = cache
//!     .get_or_fetch(&key, false, || backend.search(request))
//!     .await;
//! ```

mod fetch;
mod key;

pub use fetch::*;
pub use key::*;
