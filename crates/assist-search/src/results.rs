//! Result projection: raw backend responses to a display model.
//!
//! The backend is loosely typed. Every field may be absent, null, or carry
//! a number as a string, so the raw types keep `serde_json::Value` where
//! the shape varies and projection normalises them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SearchError;

/// Price facet reported when the backend sends none.
pub const DEFAULT_PRICE_BOUNDS: PriceBounds = PriceBounds {
    min_price: 0.0,
    max_price: 10000.0,
};

/// Slider domain used when the reported bounds are not finite.
const FALLBACK_SLIDER_DOMAIN: (f64, f64) = (0.0, 100000.0);

const PRICE_FACET: &str = "Price";
const BRAND_FACET: &str = "Brand";
const CATEGORY_FACET: &str = "Category";

/// Server-reported price facet for a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for PriceBounds {
    fn default() -> Self {
        DEFAULT_PRICE_BOUNDS
    }
}

impl PriceBounds {
    /// Ordered `(lo, hi)` domain of the price slider.
    pub fn slider_domain(&self) -> (f64, f64) {
        if !self.min_price.is_finite() || !self.max_price.is_finite() {
            return FALLBACK_SLIDER_DOMAIN;
        }
        if self.min_price <= self.max_price {
            (self.min_price, self.max_price)
        } else {
            (self.max_price, self.min_price)
        }
    }

    fn from_options(options: &Value) -> Self {
        let defaults = DEFAULT_PRICE_BOUNDS;
        match options {
            Value::Object(map) => Self {
                min_price: map
                    .get("min_price")
                    .and_then(parse_number)
                    .unwrap_or(defaults.min_price),
                max_price: map
                    .get("max_price")
                    .and_then(parse_number)
                    .unwrap_or(defaults.max_price),
            },
            _ => defaults,
        }
    }
}

/// Search response as received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub items: Option<Vec<RawItem>>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub filter_list: Option<Vec<RawFacet>>,
}

impl RawSearchResponse {
    /// Parse a response body. A `null` body is an empty response; anything
    /// else that is not an object is malformed.
    pub fn from_json(body: &str) -> Result<Self, SearchError> {
        let parsed: Option<Self> = serde_json::from_str(body)?;
        Ok(parsed.unwrap_or_default())
    }
}

/// One entry of `filter_list`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFacet {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Value,
}

/// One item as received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub sale_price: Value,
    #[serde(default)]
    pub discount_percentage: Value,
    #[serde(default)]
    pub in_stock: Value,
}

/// A facet value with its match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub name: String,
    pub count: u64,
}

/// Facets extracted from `filter_list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetSummary {
    pub price: PriceBounds,
    pub brands: Vec<FacetOption>,
    pub categories: Vec<FacetOption>,
}

impl FacetSummary {
    fn from_raw(filter_list: &[RawFacet]) -> Self {
        let options = |label: &str| {
            filter_list
                .iter()
                .find(|facet| facet.label == label)
                .map(|facet| &facet.options)
        };

        Self {
            price: options(PRICE_FACET)
                .map(PriceBounds::from_options)
                .unwrap_or_default(),
            brands: options(BRAND_FACET).map(facet_options).unwrap_or_default(),
            categories: options(CATEGORY_FACET)
                .map(facet_options)
                .unwrap_or_default(),
        }
    }
}

fn facet_options(options: &Value) -> Vec<FacetOption> {
    let Some(entries) = options.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let name = match entry.get("name")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let count = entry
                .get("count")
                .and_then(parse_number)
                .filter(|c| *c > 0.0)
                .map(|c| c as u64)
                .unwrap_or(0);
            Some(FacetOption { name, count })
        })
        .collect()
}

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages; 0 when nothing matched.
    pub total_pages: u32,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Create pagination info.
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Page numbers for display, at most `max_visible` around the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<u32> {
        if self.total_pages as usize <= max_visible {
            return (1..=self.total_pages).collect();
        }

        let window = max_visible as u32;
        let start = self.page.saturating_sub(window / 2).max(1);
        let end = (start + window).saturating_sub(1).min(self.total_pages);
        let start = (end + 1).saturating_sub(window).max(1);

        (start..=end).collect()
    }

    /// Previous control is disabled on the first page.
    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    /// Next control is disabled on the last page.
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Controls are shown only with more than one page of results.
    pub fn is_visible(&self) -> bool {
        self.total > 0 && self.total_pages > 1
    }

    /// First item number on this page (1-indexed).
    pub fn start_item(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page) + 1
        }
    }

    /// Last item number on this page.
    pub fn end_item(&self) -> u64 {
        (u64::from(self.page) * u64::from(self.per_page)).min(self.total)
    }

    /// "29-56 of 56 items", or "0 items".
    pub fn displayed_text(&self) -> String {
        if self.total == 0 {
            "0 items".to_string()
        } else {
            format!(
                "{}-{} of {} items",
                self.start_item(),
                self.end_item(),
                self.total
            )
        }
    }
}

/// Item card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub sale_price: f64,
    pub discount_percentage: Option<f64>,
    pub in_stock: bool,
    /// Derived from sale price and discount; never sent by the backend.
    pub computed_original_price: Option<f64>,
}

impl ResultItem {
    fn from_raw(raw: &RawItem) -> Self {
        let sale_price = parse_number(&raw.sale_price);
        let discount_percentage = parse_number(&raw.discount_percentage);
        Self {
            id: match &raw.id {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            },
            title: raw.title.clone().unwrap_or_default(),
            image_url: raw.image_link.clone().unwrap_or_default(),
            sale_price: sale_price.unwrap_or(0.0),
            discount_percentage,
            in_stock: is_truthy(&raw.in_stock),
            computed_original_price: compute_original_price(sale_price, discount_percentage),
        }
    }

    /// Original price with two decimals, for the struck-through label.
    pub fn original_price_text(&self) -> Option<String> {
        self.computed_original_price.map(|p| format!("{:.2}", p))
    }

    pub fn stock_label(&self) -> &'static str {
        if self.in_stock {
            "In Stock"
        } else {
            "Out of Stock"
        }
    }
}

/// Everything a renderer needs for one result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayModel {
    pub items: Vec<ResultItem>,
    pub total: u64,
    pub pagination: Pagination,
    pub facets: FacetSummary,
}

impl DisplayModel {
    /// A valid response with no items. Rendered as "Results not found".
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filter_header_text(&self) -> String {
        format!("Filters ({})", self.total)
    }

    pub fn results_header_text(text: &str) -> String {
        format!("Search Results for: {}", text)
    }
}

/// Project a raw response for `page` of a query.
pub fn project(raw: &RawSearchResponse, page: u32, page_size: u32) -> DisplayModel {
    let items: Vec<ResultItem> = raw
        .items
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(ResultItem::from_raw)
        .collect();

    let total = raw
        .total
        .as_ref()
        .and_then(parse_number)
        .filter(|t| *t > 0.0)
        .map(|t| t as u64)
        .unwrap_or(0);

    DisplayModel {
        items,
        total,
        pagination: Pagination::new(page, page_size, total),
        facets: FacetSummary::from_raw(raw.filter_list.as_deref().unwrap_or_default()),
    }
}

/// `sale / (1 - discount/100)` rounded to cents. Absent when either input
/// is missing, the discount is not positive, or the quotient is not finite
/// (a discount of exactly 100). Discounts above 100 give a negative price.
pub fn compute_original_price(sale_price: Option<f64>, discount: Option<f64>) -> Option<f64> {
    let sale = sale_price.filter(|v| v.is_finite())?;
    let discount = discount.filter(|d| d.is_finite() && *d > 0.0)?;
    let original = sale / (1.0 - discount / 100.0);
    original
        .is_finite()
        .then(|| (original * 100.0).round() / 100.0)
}

/// Lenient number: JSON numbers as-is, strings by their leading decimal
/// prefix (`"12.5 QAR"` is 12.5). Anything else is absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut digits = 0;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse().ok()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
