use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Config defines no targets.")]
    NoTargets,
    #[error("Target #{index} has an empty url.")]
    EmptyUrl { index: usize },
    #[error("Target '{target}' has jitter {jitter}; jitter must be within [0, 1].")]
    JitterOutOfRange { target: String, jitter: f64 },
    #[error("Target '{target}' asks for {workers} workers; at most {max} are allowed.")]
    TooManyWorkers { target: String, workers: i64, max: i64 },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Failure budget must allow at least one failure.")]
    FailureBudgetZero,
    #[error("Invalid API address '{value}': {source}")]
    InvalidApiAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}
