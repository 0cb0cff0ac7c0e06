use crate::base_url::BaseUrlError;
use crate::http::HttpError;

/// The registry search itself failed; the previous table stays in place.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid registry URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("registry request failed: {0}")]
    Http(#[from] HttpError),
    #[error("registry returned HTTP {status}")]
    Status { status: u16 },
    #[error("registry response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Why a single registry entry was not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HitRejection {
    #[error("malformed registry entry: {0}")]
    Malformed(String),
    #[error("missing infores identifier")]
    MissingInfores,
    #[error("no server with maturity '{0}'")]
    NoMatchingServer(String),
    #[error("unusable server URL: {0}")]
    Url(#[from] BaseUrlError),
    #[error("missing protocol version")]
    MissingVersion,
    #[error("protocol version {declared} is not compatible with {expected}")]
    VersionMismatch { declared: String, expected: String },
    #[error("no workflow operations declared")]
    NoOperations,
    #[error("entry is the runner itself")]
    SelfRegistration,
    #[error("endpoint {url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("endpoint {url} does not exist")]
    NotFound { url: String },
}
