use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::args::FailurePolicyKind;
use crate::config::PolicySettings;
use crate::probe::ProbeError;

/// What the error consumer does after logging a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Continue,
    Terminate,
}

/// Decides whether a probe failure ends the run.
pub trait FailurePolicy: Send + Sync {
    /// Called for every successful probe.
    fn on_success(&self, _target: &str) {}

    fn on_failure(&self, error: &ProbeError) -> FailureAction;
}

/// Terminates on the first failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailFast;

impl FailurePolicy for FailFast {
    fn on_failure(&self, _error: &ProbeError) -> FailureAction {
        FailureAction::Terminate
    }
}

/// Logs failures and keeps every worker running.
#[derive(Debug, Default, Clone, Copy)]
pub struct Isolate;

impl FailurePolicy for Isolate {
    fn on_failure(&self, _error: &ProbeError) -> FailureAction {
        FailureAction::Continue
    }
}

/// Terminates once one target fails `limit` times in a row.
#[derive(Debug)]
pub struct FailureBudget {
    limit: u32,
    streaks: Mutex<HashMap<String, u32>>,
}

impl FailureBudget {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            streaks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn streak(&self, target: &str) -> u32 {
        self.streaks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .copied()
            .unwrap_or(0)
    }
}

impl FailurePolicy for FailureBudget {
    fn on_success(&self, target: &str) {
        self.streaks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target);
    }

    fn on_failure(&self, error: &ProbeError) -> FailureAction {
        let mut streaks = self.streaks.lock().unwrap_or_else(PoisonError::into_inner);
        let streak = streaks.entry(error.target.clone()).or_insert(0);
        *streak = streak.saturating_add(1);
        if *streak >= self.limit {
            FailureAction::Terminate
        } else {
            FailureAction::Continue
        }
    }
}

#[must_use]
pub fn build_policy(settings: PolicySettings) -> Arc<dyn FailurePolicy> {
    match settings.kind {
        FailurePolicyKind::FailFast => Arc::new(FailFast),
        FailurePolicyKind::Isolate => Arc::new(Isolate),
        FailurePolicyKind::Budget => Arc::new(FailureBudget::new(settings.max_consecutive_failures)),
    }
}
