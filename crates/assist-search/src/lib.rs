//! Query state and its mappings for the product search client.
//!
//! This crate is free of I/O. It provides:
//!
//! - **Query state**: the canonical search intent (`QueryState`) and the
//!   filter vocabulary around it
//! - **Location codec**: `QueryState` to and from shareable location parameters
//! - **Request payload**: `QueryState` plus configuration to the exact POST body
//! - **Projection**: raw backend response to a `DisplayModel`
//!
//! # Example
//!
//! ```rust,ignore
//! use assist_search::prelude::*;
//!
//! let state = codec::from_query_string("q=phone&brands=Apple&sort=price-low-to-high");
//! let request = PreparedRequest::build(&state, &config)?;
//! let raw = RawSearchResponse::from_json(&body)?;
//! let model = project(&raw, state.page, config.page_size);
//! println!("{}", model.pagination.displayed_text());
//! ```

pub mod codec;
pub mod error;
mod filter;
mod query;
mod request;
mod results;

pub use assist_core::{Language, LanguageConfig, SearchConfig};
pub use error::SearchError;
pub use filter::{ActiveFilter, FacetField, PriceRange};
pub use query::{QueryState, SortOption};
pub use request::{
    PreparedRequest, RequestFilter, SearchRequest, HEADER_CLIENT_ID, HEADER_CONTENT_TYPE,
    HEADER_SECRET_KEY,
};
pub use results::{
    compute_original_price, parse_number, project, DisplayModel, FacetOption, FacetSummary,
    Pagination, PriceBounds, RawFacet, RawItem, RawSearchResponse, ResultItem,
    DEFAULT_PRICE_BOUNDS,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codec;
    pub use crate::error::SearchError;
    pub use crate::filter::{ActiveFilter, FacetField, PriceRange};
    pub use crate::query::{QueryState, SortOption};
    pub use crate::request::{PreparedRequest, SearchRequest};
    pub use crate::results::{
        project, DisplayModel, Pagination, PriceBounds, RawSearchResponse, ResultItem,
    };
    pub use assist_core::{Language, SearchConfig};
}
