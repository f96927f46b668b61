use std::time::Duration;

use crate::probe::jitter_bounds;

/// Base delay used when a target leaves `delay` unset or zero.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
/// Jitter fraction used when a target leaves `jitter` unset or zero.
pub const DEFAULT_JITTER: f64 = 0.2;
/// Upper bound on the replicas one target may request.
pub const MAX_WORKERS: i64 = 10_000;

/// One HTTP endpoint to probe repeatedly.
///
/// Built once from config and shared read-only (behind `Arc`) by every
/// worker spawned for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub url: String,
    pub name: Option<String>,
    /// Flattened multi-map; a header repeated in config appears once per value.
    pub headers: Vec<(String, String)>,
    /// Raw configured delay. Zero selects [`DEFAULT_DELAY`].
    pub delay: Duration,
    /// Raw configured jitter fraction. Zero selects [`DEFAULT_JITTER`].
    pub jitter: f64,
    pub trace_header: Option<String>,
    /// Raw configured replica count. Values <= 0 resolve to one worker and
    /// values above [`MAX_WORKERS`] are capped.
    pub workers: i64,
}

impl Target {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            headers: Vec::new(),
            delay: Duration::ZERO,
            jitter: 0.0,
            trace_header: None,
            workers: 1,
        }
    }

    /// Name used in logs and as the `target` metric label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.url,
        }
    }

    #[must_use]
    pub fn effective_delay(&self) -> Duration {
        if self.delay.is_zero() {
            DEFAULT_DELAY
        } else {
            self.delay
        }
    }

    #[must_use]
    pub fn effective_jitter(&self) -> f64 {
        if self.jitter > 0.0 {
            self.jitter
        } else {
            DEFAULT_JITTER
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        if self.workers <= 0 {
            return 1;
        }
        usize::try_from(self.workers.min(MAX_WORKERS)).unwrap_or(1)
    }

    /// Inclusive range every jittered sleep for this target falls within.
    #[must_use]
    pub fn sleep_bounds(&self) -> (Duration, Duration) {
        jitter_bounds(self.effective_delay(), self.effective_jitter())
    }
}
