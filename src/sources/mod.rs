pub mod news;
pub mod openai;
pub mod youtube;

/// Connector failures, split so callers can tell "not set up" from
/// "set up but broken". A missing key means fall back silently; a live
/// call that fails means fall back and flag it.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
