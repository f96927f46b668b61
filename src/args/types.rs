use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What the error consumer does after logging a probe failure.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicyKind {
    /// Terminate the whole process on the first failure.
    #[default]
    FailFast,
    /// Log the failure and keep probing.
    Isolate,
    /// Terminate once a single target reaches N consecutive failures.
    Budget,
}

impl FailurePolicyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailurePolicyKind::FailFast => "fail-fast",
            FailurePolicyKind::Isolate => "isolate",
            FailurePolicyKind::Budget => "budget",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    /// key=value records
    #[default]
    Logfmt,
    /// One JSON object per record
    Json,
}
