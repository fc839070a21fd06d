//! Error types for the API client.

/// Errors that can occur when talking to the niftyindices.com backend.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request produced no usable response (connect failure, timeout, TLS, truncated body).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered with a non-success status. `body` is a truncated snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The backend answered 2xx but the body is not the expected `{"d": ...}` document.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
    /// The request payload could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    /// The configured base URL does not form a valid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
