//! Search request payload.

use assist_core::SearchConfig;
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

use crate::error::SearchError;
use crate::query::QueryState;

pub const HEADER_CLIENT_ID: &str = "Client-Id";
pub const HEADER_SECRET_KEY: &str = "Secret-Key";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// JSON body of the search POST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub search: String,
    pub size: u32,
    pub sort_by: String,
    pub page: u32,
    pub page_size: u32,
    pub filter: RequestFilter,
}

/// Filter object of the body. Empty facet selections are omitted rather
/// than sent as empty arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(serialize_with = "serialize_price_pair")]
    pub price: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Vec<String>>,
}

/// Whole prices go out as JSON integers, fractional ones as floats.
fn serialize_price_pair<S: Serializer>(pair: &[f64; 2], serializer: S) -> Result<S::Ok, S::Error> {
    let mut tuple = serializer.serialize_tuple(2)?;
    for value in pair {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            tuple.serialize_element(&(*value as i64))?;
        } else {
            tuple.serialize_element(value)?;
        }
    }
    tuple.end()
}

/// Everything needed to issue one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// Endpoint receiving the POST.
    pub url: String,
    /// Header pairs, in send order.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: SearchRequest,
}

impl PreparedRequest {
    /// Map a query state and the credential table to a request. The language
    /// label selects the credential record; unknown labels use the first.
    pub fn build(state: &QueryState, config: &SearchConfig) -> Result<Self, SearchError> {
        let language = config
            .language(state.language.label())
            .ok_or(SearchError::NoLanguageConfig)?;

        let non_empty = |values: &std::collections::BTreeSet<String>| {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().cloned().collect::<Vec<_>>())
            }
        };

        let body = SearchRequest {
            index: language.index_name.clone(),
            search: state.text.clone(),
            size: config.result_size,
            sort_by: state.sort.sort_code().to_string(),
            page: state.page,
            page_size: config.page_size,
            filter: RequestFilter {
                category: non_empty(&state.categories),
                price: state.request_price(),
                brand: non_empty(&state.brands),
            },
        };

        Ok(Self {
            url: config.endpoint.clone(),
            headers: vec![
                (HEADER_CLIENT_ID.to_string(), language.client_id.clone()),
                (HEADER_SECRET_KEY.to_string(), language.secret_key.clone()),
                (HEADER_CONTENT_TYPE.to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    /// Serialized body.
    pub fn body_json(&self) -> Result<String, SearchError> {
        serde_json::to_string(&self.body).map_err(SearchError::from)
    }

    /// Header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers with the secret replaced, for display.
    pub fn masked_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(HEADER_SECRET_KEY) && !v.is_empty() {
                    (k.clone(), "********".to_string())
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}
