//! User events and the pure transition table.

use assist_core::Language;
use assist_search::{ActiveFilter, FacetField, PriceBounds, PriceRange, QueryState, SortOption};
use serde::{Deserialize, Serialize};

/// A discrete user action on the search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchEvent {
    /// Submit the search box. Blank text is ignored.
    SubmitText(String),
    /// Add a brand or category value if absent, else remove it.
    Toggle { field: FacetField, value: String },
    ChangeSort(SortOption),
    /// Slider thumbs moved to `min` and `max`.
    ChangePrice { min: f64, max: f64 },
    ChangeLanguage(Language),
    ChangePage(u32),
    /// Remove one chip of the active-filter summary.
    ClearFilter(ActiveFilter),
    ClearAll,
    /// Return to the previous location and refetch it.
    NavigateBack,
}

impl SearchEvent {
    /// Short name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitText(_) => "submit_text",
            Self::Toggle { .. } => "toggle",
            Self::ChangeSort(_) => "change_sort",
            Self::ChangePrice { .. } => "change_price",
            Self::ChangeLanguage(_) => "change_language",
            Self::ChangePage(_) => "change_page",
            Self::ClearFilter(_) => "clear_filter",
            Self::ClearAll => "clear_all",
            Self::NavigateBack => "navigate_back",
        }
    }
}

/// What the page currently shows, as far as transitions need to know.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageContext {
    /// Pages available for the displayed result; 0 before any result.
    pub total_pages: u32,
    /// Domain of the price slider.
    pub price_bounds: PriceBounds,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            total_pages: 0,
            price_bounds: PriceBounds::default(),
        }
    }
}

/// Location history effect of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Navigation {
    /// Leave history as is.
    Stay,
    /// Push the new state's location.
    Push,
    /// Go back one entry and revalidate it.
    Back,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: QueryState,
    /// Whether `state` differs from the input state.
    pub changed: bool,
    pub navigation: Navigation,
}

/// Apply `event` to `state`. Pure: no history, no fetching.
pub fn dispatch(state: &QueryState, event: &SearchEvent, ctx: &PageContext) -> Transition {
    if let SearchEvent::NavigateBack = event {
        return Transition {
            state: state.clone(),
            changed: false,
            navigation: Navigation::Back,
        };
    }

    let mut next = state.clone();
    match event {
        SearchEvent::SubmitText(text) => {
            if !text.trim().is_empty() {
                next.submit_text(text.as_str());
            }
        }
        SearchEvent::Toggle { field, value } => {
            next.toggle(*field, value);
        }
        SearchEvent::ChangeSort(sort) => next.set_sort(*sort),
        SearchEvent::ChangePrice { min, max } => {
            next.set_price_range_by_user(PriceRange::from_slider(ctx.price_bounds, *min, *max));
        }
        SearchEvent::ChangeLanguage(language) => next.set_language(*language),
        SearchEvent::ChangePage(page) => {
            next.set_page(*page, ctx.total_pages);
        }
        SearchEvent::ClearFilter(filter) => next.clear_filter(filter),
        SearchEvent::ClearAll => next.clear_all(),
        SearchEvent::NavigateBack => {}
    }

    let changed = next != *state;
    Transition {
        state: next,
        changed,
        navigation: if changed {
            Navigation::Push
        } else {
            Navigation::Stay
        },
    }
}
