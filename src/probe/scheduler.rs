use std::sync::Arc;

use tracing::debug;

use crate::domain::Target;
use crate::error::AppResult;
use crate::fanin::ProbeSinks;
use crate::http::{ClientOptions, InstrumentedClient};
use crate::metrics::MetricsRegistry;

use super::worker::ProbeWorker;

/// Builds every worker for every target without starting any of them.
///
/// One instrumented client is built per target and shared by its replicas.
///
/// # Errors
///
/// Returns the first configuration defect found (bad URL or header, client
/// build failure); nothing has been spawned at that point.
pub fn plan_workers(
    targets: &[Arc<Target>],
    registry: &MetricsRegistry,
    options: ClientOptions,
) -> AppResult<Vec<ProbeWorker>> {
    let mut workers = Vec::new();
    for target in targets {
        let client = InstrumentedClient::for_target(target, registry, options)?;
        let count = target.worker_count();
        for replica in 0..count {
            workers.push(ProbeWorker::new(Arc::clone(target), client.clone(), replica)?);
        }
        debug!(
            target = %target.display_name(),
            workers = count,
            "Planned probe workers"
        );
    }
    Ok(workers)
}

/// Spawns each worker as an unsupervised task and returns how many started.
#[must_use]
pub fn spawn_workers(workers: Vec<ProbeWorker>, sinks: &ProbeSinks) -> usize {
    let count = workers.len();
    for worker in workers {
        drop(tokio::spawn(worker.run(sinks.clone())));
    }
    count
}
