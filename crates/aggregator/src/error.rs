use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {status}: {context}")]
    Http { status: StatusCode, context: String },
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("Redirect loop or too many redirects (limit {0})")]
    RedirectLimit(usize),
}

/// Release feed failures. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("No XSRF-TOKEN cookie returned by {0}")]
    MissingXsrfToken(String),
}

/// Node identity failures. Drops the hostname from the output.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{domain}: discovery invalid: {reason}")]
    DiscoveryInvalid { domain: String, reason: String },
    #[error("{domain}: software {found:?} does not match {expected:?} (skipped)")]
    SoftwareMismatch {
        domain: String,
        expected: String,
        found: String,
    },
}

/// Extended API failures. Only the `api` sub-record is lost.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("api reports domain {found:?} instead of {expected:?}")]
    DomainMismatch { expected: String, found: String },
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Release feed failed: {0}")]
    Releases(#[from] ReleaseError),
    #[error("Writing artifacts failed: {0}")]
    Artifact(#[from] ArtifactError),
}

impl ProfileError {
    pub fn domain(&self) -> &str {
        match self {
            ProfileError::DiscoveryInvalid { domain, .. }
            | ProfileError::SoftwareMismatch { domain, .. } => domain,
        }
    }
}
