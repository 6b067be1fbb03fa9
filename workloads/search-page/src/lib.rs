//! Search page controller.
//!
//! Ties the query state to a browser-like location history and to the
//! search backend:
//! - Events are applied by a pure transition function ([`dispatch`])
//! - Every change of query pushes a shareable location
//! - Results are fetched through a keyed cache that joins identical
//!   in-flight requests, and only the latest key may update the view
//! - The first result's price facet seeds the price filter, costing one
//!   follow-up fetch

mod backend;
mod events;
mod history;
mod session;

pub use backend::{to_search_error, HttpSearchBackend, SearchBackend};
pub use events::{dispatch, Navigation, PageContext, SearchEvent, Transition};
pub use history::LocationHistory;
pub use session::{FetchOutcome, FetchTicket, Fetcher, ResultCache, SearchSession, ViewState};
