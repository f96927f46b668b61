use std::collections::BTreeMap;

use serde::Deserialize;

use crate::args::FailurePolicyKind;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub insecure: Option<bool>,
    pub policy: Option<PolicyConfig>,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Metrics endpoint toggle.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default)]
    pub enabled: bool,
    pub addr: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct PolicyConfig {
    pub mode: Option<FailurePolicyKind>,
    pub max_consecutive_failures: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct TargetConfig {
    pub url: String,
    pub name: Option<String>,
    pub headers: Option<BTreeMap<String, HeaderValues>>,
    /// Base delay between probes in milliseconds.
    #[serde(alias = "duration")]
    pub delay: Option<u64>,
    /// Fraction applied in each direction, so `0.2` means ±20%.
    pub jitter: Option<f64>,
    pub trace_header: Option<String>,
    pub workers: Option<i64>,
}

/// A header may be configured with one value or a list of values.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValues::One(value) => std::slice::from_ref(value),
            HeaderValues::Many(values) => values,
        }
    }
}
