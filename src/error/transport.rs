use thiserror::Error;

/// Failure surfaced by a transport while executing one probe request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {source}")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
    #[error("request template could not be cloned")]
    TemplateClone,
}

impl TransportError {
    #[must_use]
    pub fn from_request(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout { source }
        } else {
            TransportError::Request { source }
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}
