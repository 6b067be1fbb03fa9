//! Location codec: `QueryState` to and from shareable location parameters.
//!
//! | Key | Present when | Format |
//! |---|---|---|
//! | `q` | text non-empty | raw string |
//! | `lang` | always | language label |
//! | `page` | page > 1 | integer |
//! | `sort` | sort is not relevance | sort parameter value |
//! | `brands`, `categories` | set non-empty | comma-joined |
//! | `priceMin`, `priceMax` | price adjusted by user | integers |
//!
//! Decoding never fails: missing or malformed values fall back to defaults.
//! For every state reachable through user interaction,
//! `decode(&encode(s)) == s.shareable()`.

use assist_core::Language;
use url::form_urlencoded;

use crate::filter::PriceRange;
use crate::query::{QueryState, SortOption};

/// Path of the search page.
pub const SEARCH_PATH: &str = "/search";

pub const PARAM_QUERY: &str = "q";
pub const PARAM_LANGUAGE: &str = "lang";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_BRANDS: &str = "brands";
pub const PARAM_CATEGORIES: &str = "categories";
pub const PARAM_PRICE_MIN: &str = "priceMin";
pub const PARAM_PRICE_MAX: &str = "priceMax";

/// Ordered key/value pairs of a location.
pub type LocationParams = Vec<(String, String)>;

/// Encode a state as ordered location parameters.
pub fn encode(state: &QueryState) -> LocationParams {
    let mut params = Vec::new();

    if !state.text.is_empty() {
        params.push((PARAM_QUERY.to_string(), state.text.clone()));
    }

    params.push((PARAM_LANGUAGE.to_string(), state.language.label().to_string()));

    if state.page > 1 {
        params.push((PARAM_PAGE.to_string(), state.page.to_string()));
    }

    if state.sort != SortOption::Relevance {
        params.push((PARAM_SORT.to_string(), state.sort.as_str().to_string()));
    }

    if !state.brands.is_empty() {
        params.push((PARAM_BRANDS.to_string(), join_values(&state.brands)));
    }

    if !state.categories.is_empty() {
        params.push((PARAM_CATEGORIES.to_string(), join_values(&state.categories)));
    }

    if state.price_adjusted_by_user {
        if let Some(range) = state.price_range {
            params.push((PARAM_PRICE_MIN.to_string(), format_price(range.min)));
            params.push((PARAM_PRICE_MAX.to_string(), format_price(range.max)));
        }
    }

    params
}

/// Decode location parameters. The first occurrence of a key wins.
pub fn decode<I, K, V>(pairs: I) -> QueryState
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut state = QueryState::new();
    let mut seen = std::collections::HashSet::new();
    let mut price_min = None;
    let mut price_max = None;

    for (key, value) in pairs {
        let key = key.as_ref();
        let value = value.as_ref();
        if !seen.insert(key.to_string()) {
            continue;
        }

        match key {
            PARAM_QUERY => state.text = value.to_string(),
            PARAM_LANGUAGE => state.language = Language::from_label(value).unwrap_or_default(),
            PARAM_PAGE => state.page = parse_page(value),
            PARAM_SORT => state.sort = SortOption::from_param(value),
            PARAM_BRANDS => state.brands = split_values(value).collect(),
            PARAM_CATEGORIES => state.categories = split_values(value).collect(),
            PARAM_PRICE_MIN => price_min = parse_leading_int(value),
            PARAM_PRICE_MAX => price_max = parse_leading_int(value),
            _ => {}
        }
    }

    if let (Some(min), Some(max)) = (price_min, price_max) {
        state.price_range = Some(PriceRange::new(min as f64, max as f64));
        state.price_adjusted_by_user = true;
    }

    state
}

/// Encode a state as a percent-escaped query string (without `?`).
pub fn to_query_string(state: &QueryState) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(encode(state))
        .finish()
}

/// Decode a query string, with or without the leading `?`.
pub fn from_query_string(qs: &str) -> QueryState {
    let qs = qs.strip_prefix('?').unwrap_or(qs);
    decode(form_urlencoded::parse(qs.as_bytes()))
}

/// Full shareable location, e.g. `/search?q=phone&lang=English`.
pub fn to_location(state: &QueryState) -> String {
    format!("{}?{}", SEARCH_PATH, to_query_string(state))
}

/// Decode the query part of a location or URL. Anything before `?` and
/// after `#` is ignored.
pub fn from_location(location: &str) -> QueryState {
    let without_fragment = location.split('#').next().unwrap_or("");
    let query = without_fragment
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or("");
    from_query_string(query)
}

/// Location the landing page navigates to for a submitted query.
pub fn landing_location(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(PARAM_QUERY, text)
        .finish();
    Some(format!("{}?{}", SEARCH_PATH, query))
}

fn format_price(value: f64) -> String {
    (value.round() as i64).to_string()
}

fn parse_page(value: &str) -> u32 {
    match parse_leading_int(value) {
        Some(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Leading base-10 integer of `value`: optional whitespace, optional sign,
/// then digits. Trailing garbage is ignored; no digits yields `None`.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() {
        return None;
    }

    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Comma-join values, escaping `%` and `,` inside each value so values
/// containing commas survive the split.
fn join_values<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(|value| value.replace('%', "%25").replace(',', "%2C"))
        .collect::<Vec<_>>()
        .join(",")
}

fn split_values(joined: &str) -> impl Iterator<Item = String> + '_ {
    joined
        .split(',')
        .filter(|part| !part.is_empty())
        .map(unescape_value)
}

fn unescape_value(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("%2C") || tail.starts_with("%2c") {
            out.push(',');
            rest = &tail[3..];
        } else if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3..];
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
