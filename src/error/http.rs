use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}' for target '{target}': {source}")]
    InvalidUrl {
        target: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header name '{name}' for target '{target}': {source}")]
    InvalidHeaderName {
        target: String,
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderName,
    },
    #[error("Invalid value for header '{name}' on target '{target}': {source}")]
    InvalidHeaderValue {
        target: String,
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Failed to build HTTP client for target '{target}': {source}")]
    BuildClientFailed {
        target: String,
        #[source]
        source: reqwest::Error,
    },
}
