//! The canonical search intent.

use std::collections::BTreeSet;

use assist_core::Language;
use serde::{Deserialize, Serialize};

use crate::filter::{ActiveFilter, FacetField, PriceRange};
use crate::results::PriceBounds;

/// Sort options offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Backend relevance ranking.
    #[default]
    Relevance,
    /// Sort by price, high to low.
    PriceHighToLow,
    /// Sort by price, low to high.
    PriceLowToHigh,
}

impl SortOption {
    /// All options, in menu order.
    pub const ALL: [SortOption; 3] = [
        SortOption::Relevance,
        SortOption::PriceHighToLow,
        SortOption::PriceLowToHigh,
    ];

    /// Location parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceHighToLow => "price-high-to-low",
            Self::PriceLowToHigh => "price-low-to-high",
        }
    }

    /// Parse a location parameter value; anything unknown is relevance.
    pub fn from_param(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .unwrap_or_default()
    }

    /// Numeric code sent as `sort_by`.
    pub fn sort_code(&self) -> &'static str {
        match self {
            Self::Relevance => "1",
            Self::PriceHighToLow => "2",
            Self::PriceLowToHigh => "3",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::PriceHighToLow => "Price: High to Low",
            Self::PriceLowToHigh => "Price: Low to High",
        }
    }
}

/// Single source of truth for search intent.
///
/// A plain value: equality is structural. Every filter mutation below
/// resets `page` to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    /// Free-form query; a search is issued only when non-empty.
    pub text: String,
    /// Selects the backend index and credentials.
    pub language: Language,
    /// Current page (1-indexed).
    pub page: u32,
    /// Sort option.
    pub sort: SortOption,
    /// Selected brands, kept sorted so serialization is deterministic.
    pub brands: BTreeSet<String>,
    /// Selected categories.
    pub categories: BTreeSet<String>,
    /// Price interval, unset until the user or the backend provides one.
    pub price_range: Option<PriceRange>,
    /// True once the user set `price_range` explicitly. Server defaults may
    /// only overwrite the range while this is false.
    pub price_adjusted_by_user: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryState {
    /// Create an empty query.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            language: Language::English,
            page: 1,
            sort: SortOption::Relevance,
            brands: BTreeSet::new(),
            categories: BTreeSet::new(),
            price_range: None,
            price_adjusted_by_user: false,
        }
    }

    /// Set the text query.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Whether this state identifies a fetchable search.
    pub fn is_searchable(&self) -> bool {
        !self.text.is_empty()
    }

    /// Selected values of a facet.
    pub fn values(&self, field: FacetField) -> &BTreeSet<String> {
        match field {
            FacetField::Brand => &self.brands,
            FacetField::Category => &self.categories,
        }
    }

    fn values_mut(&mut self, field: FacetField) -> &mut BTreeSet<String> {
        match field {
            FacetField::Brand => &mut self.brands,
            FacetField::Category => &mut self.categories,
        }
    }

    /// Replace the text and start from the first page.
    pub fn submit_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.page = 1;
    }

    /// Add `value` if absent, else remove it. Empty values are ignored.
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, field: FacetField, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        let values = self.values_mut(field);
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        self.page = 1;
        true
    }

    /// Remove a single selected value.
    pub fn remove(&mut self, field: FacetField, value: &str) {
        self.values_mut(field).remove(value);
        self.page = 1;
    }

    /// Set the sort option; relevance clears it.
    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
        self.page = 1;
    }

    /// Record a user-chosen price range.
    pub fn set_price_range_by_user(&mut self, range: PriceRange) {
        self.price_range = Some(range);
        self.price_adjusted_by_user = true;
        self.page = 1;
    }

    /// Switch the result language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.page = 1;
    }

    /// Move to `page` if it lies in `[1, total_pages]`. Returns whether the
    /// page changed; out-of-range requests are no-ops.
    pub fn set_page(&mut self, page: u32, total_pages: u32) -> bool {
        if page < 1 || page > total_pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// `|brands| + |categories| + (sort != relevance)`. Price never counts.
    pub fn active_filter_count(&self) -> usize {
        self.brands.len()
            + self.categories.len()
            + usize::from(self.sort != SortOption::Relevance)
    }

    /// Active-filter chips: sort first, then brands, then categories.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        let mut chips = Vec::with_capacity(self.active_filter_count());
        if self.sort != SortOption::Relevance {
            chips.push(ActiveFilter::Sort(self.sort));
        }
        chips.extend(self.brands.iter().cloned().map(ActiveFilter::Brand));
        chips.extend(self.categories.iter().cloned().map(ActiveFilter::Category));
        chips
    }

    /// Remove one chip.
    pub fn clear_filter(&mut self, filter: &ActiveFilter) {
        match filter {
            ActiveFilter::Sort(_) => self.set_sort(SortOption::Relevance),
            ActiveFilter::Brand(name) => self.remove(FacetField::Brand, name),
            ActiveFilter::Category(name) => self.remove(FacetField::Category, name),
        }
    }

    /// Reset brands, categories and sort. Text and language survive, and the
    /// price range survives only if the user set it.
    pub fn clear_all(&mut self) {
        self.brands.clear();
        self.categories.clear();
        self.sort = SortOption::Relevance;
        if !self.price_adjusted_by_user {
            self.price_range = None;
        }
        self.page = 1;
    }

    /// Adopt the server-reported price facet as the range, unless the user
    /// has already chosen one. Returns whether the state changed.
    pub fn apply_default_price(&mut self, bounds: PriceBounds) -> bool {
        if self.price_adjusted_by_user {
            return false;
        }
        let range = Some(PriceRange::new(bounds.min_price, bounds.max_price));
        if self.price_range == range {
            return false;
        }
        self.price_range = range;
        true
    }

    /// The part of the state a location carries: a server-default price
    /// range is dropped, since the next fetch derives it again.
    pub fn shareable(&self) -> Self {
        let mut state = self.clone();
        if !state.price_adjusted_by_user {
            state.price_range = None;
        }
        state
    }

    /// Price pair sent to the backend; `[0, 0]` while unset.
    pub fn request_price(&self) -> [f64; 2] {
        self.price_range
            .map(|range| range.as_pair())
            .unwrap_or([0.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered_state() -> QueryState {
        let mut state = QueryState::new().with_text("phone");
        state.toggle(FacetField::Brand, "Apple");
        state.toggle(FacetField::Brand, "Samsung");
        state.toggle(FacetField::Category, "Mobiles");
        state.set_sort(SortOption::PriceLowToHigh);
        state.page = 3;
        state
    }

    #[test]
    fn test_sort_option_codes() {
        assert_eq!(SortOption::Relevance.sort_code(), "1");
        assert_eq!(SortOption::PriceHighToLow.sort_code(), "2");
        assert_eq!(SortOption::PriceLowToHigh.sort_code(), "3");
    }

    #[test]
    fn test_sort_option_parse() {
        for option in SortOption::ALL {
            assert_eq!(SortOption::from_param(option.as_str()), option);
        }
        assert_eq!(SortOption::from_param("newest"), SortOption::Relevance);
    }

    #[test]
    fn test_active_filter_count_ignores_price() {
        let mut state = filtered_state();
        assert_eq!(state.active_filter_count(), 4);

        state.set_price_range_by_user(PriceRange::new(10.0, 50.0));
        assert_eq!(state.active_filter_count(), 4);

        state.set_sort(SortOption::Relevance);
        assert_eq!(state.active_filter_count(), 3);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut state = QueryState::new();
        assert!(state.toggle(FacetField::Brand, "Apple"));
        assert!(state.brands.contains("Apple"));
        assert!(state.toggle(FacetField::Brand, "Apple"));
        assert!(state.brands.is_empty());
        assert!(!state.toggle(FacetField::Brand, ""));
    }

    #[test]
    fn test_mutations_reset_page() {
        let mut state = filtered_state();
        state.toggle(FacetField::Category, "Tablets");
        assert_eq!(state.page, 1);

        state.page = 4;
        state.set_sort(SortOption::PriceHighToLow);
        assert_eq!(state.page, 1);

        state.page = 4;
        state.set_price_range_by_user(PriceRange::new(1.0, 20.0));
        assert_eq!(state.page, 1);

        state.page = 4;
        state.set_language(Language::Arabic);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_set_page_bounds() {
        let mut state = QueryState::new();
        assert!(state.set_page(2, 3));
        assert!(!state.set_page(0, 3));
        assert!(!state.set_page(4, 3));
        assert!(!state.set_page(2, 3));
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_active_filter_chip_order() {
        let state = filtered_state();
        assert_eq!(
            state.active_filters(),
            vec![
                ActiveFilter::Sort(SortOption::PriceLowToHigh),
                ActiveFilter::Brand("Apple".into()),
                ActiveFilter::Brand("Samsung".into()),
                ActiveFilter::Category("Mobiles".into()),
            ]
        );
    }

    #[test]
    fn test_clear_filter_chip() {
        let mut state = filtered_state();
        state.clear_filter(&ActiveFilter::Brand("Apple".into()));
        state.clear_filter(&ActiveFilter::Sort(SortOption::PriceLowToHigh));
        assert_eq!(state.brands.len(), 1);
        assert_eq!(state.sort, SortOption::Relevance);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_clear_all_preserves_user_price() {
        let mut state = filtered_state().with_language(Language::Arabic);
        state.set_price_range_by_user(PriceRange::new(10.0, 50.0));
        state.page = 2;
        state.clear_all();

        assert_eq!(state.text, "phone");
        assert_eq!(state.language, Language::Arabic);
        assert_eq!(state.active_filter_count(), 0);
        assert_eq!(state.price_range, Some(PriceRange::new(10.0, 50.0)));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_clear_all_drops_default_price() {
        let mut state = filtered_state();
        state.apply_default_price(PriceBounds {
            min_price: 5.0,
            max_price: 200.0,
        });
        state.clear_all();
        assert_eq!(state.price_range, None);
    }

    #[test]
    fn test_default_price_only_when_not_adjusted() {
        let bounds = PriceBounds {
            min_price: 5.0,
            max_price: 200.0,
        };

        let mut state = QueryState::new();
        assert!(state.apply_default_price(bounds));
        assert_eq!(state.price_range, Some(PriceRange::new(5.0, 200.0)));
        assert!(!state.price_adjusted_by_user);
        assert!(!state.apply_default_price(bounds));

        let mut state = QueryState::new();
        state.set_price_range_by_user(PriceRange::new(10.0, 50.0));
        assert!(!state.apply_default_price(bounds));
        assert_eq!(state.price_range, Some(PriceRange::new(10.0, 50.0)));
    }

    #[test]
    fn test_request_price_defaults_to_zero_pair() {
        let mut state = QueryState::new();
        assert_eq!(state.request_price(), [0.0, 0.0]);
        state.set_price_range_by_user(PriceRange::new(3.0, 9.0));
        assert_eq!(state.request_price(), [3.0, 9.0]);
    }

    #[test]
    fn test_shareable_drops_default_price() {
        let mut state = QueryState::new().with_text("tv");
        state.apply_default_price(PriceBounds {
            min_price: 1.0,
            max_price: 2.0,
        });
        assert_eq!(state.shareable().price_range, None);

        state.set_price_range_by_user(PriceRange::new(1.0, 2.0));
        assert_eq!(state.shareable(), state);
    }
}
