use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::probe::{ProbeError, ProbeResult};

use super::policy::{FailureAction, FailurePolicy};
use super::rendezvous::{RendezvousReceiver, RendezvousSender, rendezvous};

/// Producer handles given to every probe worker.
#[derive(Clone)]
pub struct ProbeSinks {
    pub results: RendezvousSender<ProbeResult>,
    pub errors: RendezvousSender<ProbeError>,
}

pub struct FanInReceivers {
    pub results: RendezvousReceiver<ProbeResult>,
    pub errors: RendezvousReceiver<ProbeError>,
}

/// Why a consumer task stopped.
#[derive(Debug)]
pub enum FanInOutcome {
    /// The policy ended the run on this failure.
    Terminated(ProbeError),
    /// Every producer went away.
    Closed,
}

pub struct FanInHandles {
    pub results: JoinHandle<FanInOutcome>,
    pub errors: JoinHandle<FanInOutcome>,
}

#[must_use]
pub fn fan_in_channels() -> (ProbeSinks, FanInReceivers) {
    let (results_tx, results_rx) = rendezvous();
    let (errors_tx, errors_rx) = rendezvous();
    (
        ProbeSinks {
            results: results_tx,
            errors: errors_tx,
        },
        FanInReceivers {
            results: results_rx,
            errors: errors_rx,
        },
    )
}

/// Logs every result and reports it to the policy.
pub async fn consume_results(
    mut results: RendezvousReceiver<ProbeResult>,
    policy: Arc<dyn FailurePolicy>,
) -> FanInOutcome {
    while let Some(result) = results.recv().await {
        if result.trace_id.is_empty() {
            info!(
                target = %result.target,
                method = %result.method,
                status = %result.status(),
                url = %result.url,
                latency = ?result.latency,
                "probe succeeded"
            );
        } else {
            info!(
                target = %result.target,
                method = %result.method,
                status = %result.status(),
                url = %result.url,
                latency = ?result.latency,
                trace_id = %result.trace_id,
                "probe succeeded"
            );
        }
        policy.on_success(&result.target);
    }
    debug!("Result channel closed");
    FanInOutcome::Closed
}

/// Logs every failure and stops when the policy says so.
pub async fn consume_errors(
    mut errors: RendezvousReceiver<ProbeError>,
    policy: Arc<dyn FailurePolicy>,
) -> FanInOutcome {
    while let Some(probe_error) = errors.recv().await {
        error!(
            target = %probe_error.target,
            error = %probe_error.message,
            timed_out = probe_error.timed_out,
            "probe failed"
        );
        if policy.on_failure(&probe_error) == FailureAction::Terminate {
            return FanInOutcome::Terminated(probe_error);
        }
    }
    debug!("Error channel closed");
    FanInOutcome::Closed
}

#[must_use]
pub fn spawn_consumers(
    receivers: FanInReceivers,
    policy: &Arc<dyn FailurePolicy>,
) -> FanInHandles {
    FanInHandles {
        results: tokio::spawn(consume_results(receivers.results, Arc::clone(policy))),
        errors: tokio::spawn(consume_errors(receivers.errors, Arc::clone(policy))),
    }
}
