//! Search error types.

use thiserror::Error;

/// Message used when the backend gives no reason for a failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch data";

/// Errors local to a single fetch cycle. None of them leave the query state
/// inconsistent; they are rendered inline and the user may navigate back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Non-2xx response or transport failure.
    #[error("{message}")]
    RequestFailed { message: String },

    /// 2xx response whose body is not a search response.
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    /// The credential table has no entries.
    #[error("No language configuration available")]
    NoLanguageConfig,
}

impl SearchError {
    /// Build a `RequestFailed`, substituting the generic message when the
    /// server message is absent or blank.
    pub fn request_failed(message: Option<&str>) -> Self {
        let message = match message.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        };
        SearchError::RequestFailed { message }
    }

    /// Text shown to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_uses_server_message() {
        let err = SearchError::request_failed(Some("Invalid secret key"));
        assert_eq!(err.user_message(), "Invalid secret key");
    }

    #[test]
    fn test_request_failed_falls_back_to_generic() {
        assert_eq!(
            SearchError::request_failed(None).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            SearchError::request_failed(Some("  ")).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
