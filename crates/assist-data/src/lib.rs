//! HTTP client utilities for the search assist client.
//!
//! Provides a small builder API over `reqwest` with automatic JSON handling
//! and fully buffered responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use assist_data::FetchClient;
//!
//! let client = FetchClient::new().with_timeout(Duration::from_secs(15));
//!
//! let response = client
//!     .post("https://uat.search-assist.webc.in/api/search")
//!     .headers([
//!         ("Client-Id".to_string(), client_id),
//!         ("Secret-Key".to_string(), secret_key),
//!     ])
//!     .json(&body)?
//!     .send()
//!     .await?
//!     .error_for_status()?;
//!
//! let value: serde_json::Value = response.json()?;
//! ```

mod error;
mod request;
mod response;

use std::collections::HashMap;
use std::time::Duration;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;

/// HTTP client for making outbound requests.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout: None,
        }
    }

    /// Timeout applied to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let mut builder = RequestBuilder::new(method, url);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        ClientRequestBuilder {
            http: self.http.clone(),
            builder,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    http: reqwest::Client,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.builder = self.builder.headers(headers);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// The request as built so far.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and buffer the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        let RequestBuilder {
            method,
            url,
            headers,
            body,
            timeout,
        } = self.builder;

        let mut request = self.http.request(method.into(), url.as_str());
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_carries_timeout_headers_and_json() {
        let client = FetchClient::new().with_timeout(Duration::from_secs(15));
        let req = client
            .post("https://uat.search-assist.webc.in/api/search")
            .headers([("Client-Id".to_string(), "abc".to_string())])
            .json(&serde_json::json!({ "search": "phone" }))
            .unwrap();

        assert_eq!(req.request().method(), Method::Post);
        assert_eq!(req.request().url(), "https://uat.search-assist.webc.in/api/search");
        assert_eq!(req.request().header_value("client-id"), Some("abc"));
        assert_eq!(req.request().header_value("Content-Type"), Some("application/json"));
        assert_eq!(req.request().timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_no_timeout_by_default() {
        let req = FetchClient::default().post("https://api.example/search");
        assert_eq!(req.request().timeout, None);
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_url() {
        let result = FetchClient::new().post("not a url").send().await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
