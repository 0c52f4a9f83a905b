//! Errors returned by the expense backend client.

/// Why a request to the PCS backend failed.
///
/// The variants are kept apart for logging. The user interface collapses them
/// into a single message unless [crate::ErrorDetail::Detailed] is configured.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the response body could not be read,
    /// e.g., the backend is down or the connection was reset.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-2xx status code.
    #[error("the backend responded with status code {0}")]
    Status(u16),

    /// The response body was not the JSON shape we expected.
    #[error("could not decode the response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Request(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Decode(error.to_string())
    }
}
