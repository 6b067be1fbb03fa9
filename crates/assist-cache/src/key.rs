//! Query key composition.

use std::hash::{Hash, Hasher};

use assist_search::QueryState;
use serde::{Deserialize, Serialize};

/// Identity of one fetchable search request:
/// `(endpoint, text, page, filters, sort, language)`.
///
/// Two states with equal keys produce byte-identical requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key (for debugging).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl QueryKey {
    /// Compose the key for fetching `state` from `endpoint`.
    pub fn new(endpoint: &str, state: &QueryState) -> Self {
        let [price_min, price_max] = state.request_price();
        let join = |values: &std::collections::BTreeSet<String>| {
            values
                .iter()
                .map(|v| v.replace('\\', "\\\\").replace(',', "\\,"))
                .collect::<Vec<_>>()
                .join(",")
        };

        let components = vec![
            format!("endpoint:{}", endpoint),
            format!("q:{}", state.text),
            format!("page:{}", state.page),
            format!("brands:{}", join(&state.brands)),
            format!("categories:{}", join(&state.categories)),
            format!("price:{}:{}", price_min, price_max),
            format!("sort:{}", state.sort.as_str()),
            format!("lang:{}", state.language.label()),
        ];

        // Length-prefixed so no component value can forge a separator.
        let key = components
            .iter()
            .map(|c| format!("{}#{}", c.len(), c))
            .collect::<Vec<_>>()
            .join("|");

        Self { key, components }
    }

    /// Create a key from a raw string.
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Short hex digest, for log lines.
    pub fn digest(&self) -> String {
        format!("{:016x}", simple_hash(&self.key))
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.components.join(" "))
    }
}

// Simple non-cryptographic hash for log output
fn simple_hash(s: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_search::{FacetField, Language, PriceBounds, PriceRange, SortOption};

    const ENDPOINT: &str = "https://uat.search-assist.webc.in/api/search";

    fn state() -> QueryState {
        let mut state = QueryState::new().with_text("phone");
        state.toggle(FacetField::Brand, "Apple");
        state
    }

    #[test]
    fn test_equal_states_equal_keys() {
        let a = QueryKey::new(ENDPOINT, &state());
        let b = QueryKey::new(ENDPOINT, &state());
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_every_component_changes_the_key() {
        let base = QueryKey::new(ENDPOINT, &state());
        let variants: Vec<Box<dyn Fn(&mut QueryState)>> = vec![
            Box::new(|s: &mut QueryState| s.submit_text("tablet")),
            Box::new(|s: &mut QueryState| s.page = 2),
            Box::new(|s: &mut QueryState| {
                s.toggle(FacetField::Brand, "Sony");
            }),
            Box::new(|s: &mut QueryState| {
                s.toggle(FacetField::Category, "Mobiles");
            }),
            Box::new(|s: &mut QueryState| s.set_sort(SortOption::PriceHighToLow)),
            Box::new(|s: &mut QueryState| s.set_language(Language::Arabic)),
            Box::new(|s: &mut QueryState| s.set_price_range_by_user(PriceRange::new(10.0, 20.0))),
        ];

        for change in variants {
            let mut changed = state();
            change(&mut changed);
            assert_ne!(QueryKey::new(ENDPOINT, &changed), base);
        }

        assert_ne!(QueryKey::new("https://other.example/search", &state()), base);
    }

    #[test]
    fn test_bootstrapped_price_is_part_of_the_key() {
        let mut bootstrapped = state();
        bootstrapped.apply_default_price(PriceBounds {
            min_price: 5.0,
            max_price: 200.0,
        });
        assert_ne!(
            QueryKey::new(ENDPOINT, &bootstrapped),
            QueryKey::new(ENDPOINT, &state())
        );
    }

    #[test]
    fn test_values_cannot_collide_across_components() {
        let mut a = QueryState::new().with_text("x");
        a.toggle(FacetField::Brand, "a,b");
        let mut b = QueryState::new().with_text("x");
        b.toggle(FacetField::Brand, "a");
        b.toggle(FacetField::Brand, "b");
        assert_ne!(QueryKey::new(ENDPOINT, &a), QueryKey::new(ENDPOINT, &b));

        let c = QueryState::new().with_text("x|4#page:1");
        let d = QueryState::new().with_text("x");
        assert_ne!(QueryKey::new(ENDPOINT, &c), QueryKey::new(ENDPOINT, &d));
    }

    #[test]
    fn test_display_lists_components() {
        let key = QueryKey::new(ENDPOINT, &state());
        let shown = key.to_string();
        assert!(shown.contains("q:phone"));
        assert!(shown.contains("brands:Apple"));
        assert!(shown.contains("lang:English"));
        assert_eq!(key.components().len(), 8);
    }
}
