use std::time::Duration;

use http::Method;
use thiserror::Error;

use crate::error::TransportError;

/// Outcome of one successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: String,
    pub method: Method,
    pub status_code: u16,
    pub status_text: String,
    pub url: String,
    pub latency: Duration,
    /// Empty when the target has no trace header or the response lacks it.
    pub trace_id: String,
}

impl ProbeResult {
    /// Status line in the `200 OK` form.
    #[must_use]
    pub fn status(&self) -> String {
        if self.status_text.is_empty() {
            self.status_code.to_string()
        } else {
            format!("{} {}", self.status_code, self.status_text)
        }
    }
}

/// A probe that failed in the transport (DNS, connect, timeout, body read).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProbeError {
    pub target: String,
    pub message: String,
    pub timed_out: bool,
}

impl ProbeError {
    #[must_use]
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    #[must_use]
    pub fn from_transport(target: &str, error: &TransportError) -> Self {
        Self {
            target: target.to_owned(),
            message: error.to_string(),
            timed_out: error.is_timeout(),
        }
    }
}
