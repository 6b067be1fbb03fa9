//! Search backend seam.

use std::time::Duration;

use assist_data::{FetchClient, FetchError};
use assist_search::{PreparedRequest, RawSearchResponse, SearchError};
use async_trait::async_trait;

/// Executes prepared search requests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Send `request` and return the raw response.
    async fn search(&self, request: PreparedRequest) -> Result<RawSearchResponse, SearchError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Backend speaking to the HTTP search endpoint.
#[derive(Clone)]
pub struct HttpSearchBackend {
    client: FetchClient,
}

impl HttpSearchBackend {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: FetchClient::new().with_timeout(timeout),
        }
    }

    pub fn with_client(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, request: PreparedRequest) -> Result<RawSearchResponse, SearchError> {
        let response = self
            .client
            .post(request.url.as_str())
            .headers(request.headers.iter().cloned())
            .json(&request.body)
            .map_err(to_search_error)?
            .send()
            .await
            .map_err(to_search_error)?
            .error_for_status()
            .map_err(to_search_error)?;

        let body = response.text().map_err(to_search_error)?;
        RawSearchResponse::from_json(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Failures become `RequestFailed` with the server's message when it sent one.
pub fn to_search_error(error: FetchError) -> SearchError {
    match error {
        FetchError::ParseError(message) => SearchError::MalformedResponse(message),
        other => SearchError::request_failed(other.server_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assist_search::error::GENERIC_FAILURE_MESSAGE;

    #[test]
    fn test_server_message_is_surfaced() {
        let err = to_search_error(FetchError::HttpError {
            status: 401,
            message: "Invalid client id".into(),
        });
        assert_eq!(err.user_message(), "Invalid client id");
    }

    #[test]
    fn test_transport_errors_use_generic_message() {
        for error in [
            FetchError::Timeout,
            FetchError::RequestError("connection refused".into()),
            FetchError::HttpError {
                status: 502,
                message: String::new(),
            },
        ] {
            assert_eq!(to_search_error(error).user_message(), GENERIC_FAILURE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_cleanly() {
        let backend = HttpSearchBackend::new(Duration::from_secs(1));
        let request = PreparedRequest::build(
            &assist_search::QueryState::new().with_text("x"),
            &assist_search::SearchConfig {
                endpoint: "not a url".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let err = backend.search(request).await.unwrap_err();
        assert!(matches!(err, SearchError::RequestFailed { .. }));
    }
}
