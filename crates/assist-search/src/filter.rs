//! Search filter types.

use serde::{Deserialize, Serialize};

use crate::query::SortOption;
use crate::results::PriceBounds;

/// Smallest gap the price slider keeps between its two thumbs.
pub const MIN_PRICE_DISTANCE: f64 = 10.0;

/// A multi-valued facet the user toggles values of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetField {
    Brand,
    Category,
}

impl FacetField {
    /// Location parameter holding the selected values.
    pub fn param(&self) -> &'static str {
        match self {
            Self::Brand => "brands",
            Self::Category => "categories",
        }
    }

    /// Facet label reported by the backend in `filter_list`.
    pub fn facet_label(&self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::Category => "Category",
        }
    }
}

/// A closed price interval, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Create a range, swapping the bounds if given in the wrong order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Range chosen on the price slider whose domain is `bounds`.
    ///
    /// Both thumbs are clamped into the domain and rounded to whole units,
    /// and the thumbs stay at least [`MIN_PRICE_DISTANCE`] apart whenever the
    /// domain is wide enough.
    pub fn from_slider(bounds: PriceBounds, min: f64, max: f64) -> Self {
        let (lo, hi) = bounds.slider_domain();
        let a = if min.is_finite() { min.clamp(lo, hi) } else { lo };
        let b = if max.is_finite() { max.clamp(lo, hi) } else { hi };
        let Self { mut min, mut max } = Self::new(a, b);

        if max - min < MIN_PRICE_DISTANCE {
            if hi - lo <= MIN_PRICE_DISTANCE {
                min = lo;
                max = hi;
            } else {
                max = (min + MIN_PRICE_DISTANCE).min(hi);
                min = (max - MIN_PRICE_DISTANCE).max(lo);
            }
        }

        Self::new(min.round(), max.round())
    }

    /// Two-element form used on the wire.
    pub fn as_pair(&self) -> [f64; 2] {
        [self.min, self.max]
    }

    /// Whether `price` lies inside the range.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// One chip of the active-filter summary. Price is deliberately absent:
/// it never counts as an active filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveFilter {
    Sort(SortOption),
    Brand(String),
    Category(String),
}

impl ActiveFilter {
    /// Chip label.
    pub fn label(&self) -> String {
        match self {
            Self::Sort(sort) => format!("Sort: {}", sort.display_name()),
            Self::Brand(name) | Self::Category(name) => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: f64, max: f64) -> PriceBounds {
        PriceBounds {
            min_price: min,
            max_price: max,
        }
    }

    #[test]
    fn test_new_orders_bounds() {
        let range = PriceRange::new(50.0, 10.0);
        assert_eq!(range.as_pair(), [10.0, 50.0]);
        assert!(range.contains(10.0));
        assert!(range.contains(50.0));
        assert!(!range.contains(50.5));
    }

    #[test]
    fn test_slider_clamps_into_domain() {
        let range = PriceRange::from_slider(bounds(0.0, 1000.0), -50.0, 2000.0);
        assert_eq!(range.as_pair(), [0.0, 1000.0]);
    }

    #[test]
    fn test_slider_swaps_and_rounds() {
        let range = PriceRange::from_slider(bounds(0.0, 1000.0), 100.4, 49.6);
        assert_eq!(range.as_pair(), [50.0, 100.0]);
    }

    #[test]
    fn test_slider_keeps_minimum_distance() {
        let range = PriceRange::from_slider(bounds(0.0, 1000.0), 100.0, 105.0);
        assert_eq!(range.as_pair(), [100.0, 110.0]);

        let range = PriceRange::from_slider(bounds(0.0, 1000.0), 995.0, 1000.0);
        assert_eq!(range.as_pair(), [990.0, 1000.0]);
    }

    #[test]
    fn test_slider_narrow_domain_spans_everything() {
        let range = PriceRange::from_slider(bounds(0.0, 5.0), 1.0, 2.0);
        assert_eq!(range.as_pair(), [0.0, 5.0]);
    }

    #[test]
    fn test_slider_non_finite_inputs() {
        let range = PriceRange::from_slider(bounds(0.0, 500.0), f64::NAN, f64::INFINITY);
        assert_eq!(range.as_pair(), [0.0, 500.0]);

        let range = PriceRange::from_slider(bounds(f64::NAN, f64::NAN), 20.0, 80.0);
        assert_eq!(range.as_pair(), [20.0, 80.0]);
    }

    #[test]
    fn test_chip_labels() {
        assert_eq!(
            ActiveFilter::Sort(SortOption::PriceHighToLow).label(),
            "Sort: Price: High to Low"
        );
        assert_eq!(ActiveFilter::Brand("Apple".into()).label(), "Apple");
    }

    #[test]
    fn test_facet_field_names() {
        assert_eq!(FacetField::Brand.param(), "brands");
        assert_eq!(FacetField::Category.param(), "categories");
        assert_eq!(FacetField::Category.facet_label(), "Category");
    }
}
