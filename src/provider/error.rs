use thiserror::Error;

/// Failures talking to the calling provider's log API
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} environment variable not set")]
    MissingConfig(&'static str),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("Provider returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}
