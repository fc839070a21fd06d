//! Error types for the library layer.

use std::fmt;
use std::path::PathBuf;

/// Why fetching one index failed.
///
/// `Network`, `Upstream` and `SoftEmpty` describe a single attempt and are
/// all retryable. `RetryExhausted` is terminal for that index only; the
/// batch moves on to the next one.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Connection failure or timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success status or a body that is not the expected document.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// Valid response without any data points, usually a stale session.
    #[error("upstream returned no records")]
    SoftEmpty,
    #[error("giving up on {index} after {attempts} attempts: {last}")]
    RetryExhausted {
        index: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::RetryExhausted { .. })
    }

    /// Requests made before this error was returned.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RetryExhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}

impl From<niftyindices_api::Error> for FetchError {
    fn from(e: niftyindices_api::Error) -> Self {
        use niftyindices_api::Error as Api;
        match e {
            Api::Network(err) => Self::Network(err.to_string()),
            Api::HttpStatus { status, body } => {
                if body.is_empty() {
                    Self::Upstream(format!("HTTP {}", status))
                } else {
                    Self::Upstream(format!("HTTP {}: {}", status, body))
                }
            }
            Api::MalformedBody(msg) => Self::Upstream(format!("malformed body: {}", msg)),
            Api::Encode(err) => Self::Upstream(format!("request encoding failed: {}", err)),
            Api::InvalidUrl(msg) => Self::Upstream(format!("invalid URL: {}", msg)),
        }
    }
}

/// Problems with input files or settings. Always fatal, raised before any
/// index is fetched.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} lists no indices", .path.display())]
    EmptyIndexList { path: PathBuf },
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failures writing the output directory. Recorded against the index
/// being saved; the batch continues.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Setup errors from the library layer: the API client could not be built
/// or the configuration is unusable. Per-index fetch and storage failures
/// are recorded in the run summary instead.
#[derive(Debug)]
pub enum NiftyError {
    /// An error from the underlying API client.
    Api(niftyindices_api::Error),
    /// Input files or settings are unusable.
    Config(ConfigError),
}

impl fmt::Display for NiftyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for NiftyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<niftyindices_api::Error> for NiftyError {
    fn from(e: niftyindices_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<ConfigError> for NiftyError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
