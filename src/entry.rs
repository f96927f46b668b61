use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use crate::api;
use crate::args::ZombieArgs;
use crate::config::{RunSettings, load_config, resolve_settings};
use crate::error::{AppError, AppResult, ConfigError};
use crate::fanin::{FanInOutcome, build_policy, fan_in_channels, spawn_consumers};
use crate::metrics::MetricsRegistry;
use crate::probe::{plan_workers, spawn_workers};
use crate::shutdown_handlers::ShutdownListener;

/// Parses the command line, loads configuration and probes until a signal
/// or a terminating failure.
///
/// # Errors
///
/// Returns an error for any startup failure and when the failure policy ends
/// the run.
pub fn run() -> AppResult<()> {
    let args = ZombieArgs::parse();

    crate::logger::init_logging(args.verbose, args.no_color, args.log_format);

    let result = start(&args);
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

fn start(args: &ZombieArgs) -> AppResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    // Registered before config load; signals during startup are kept.
    let shutdown = {
        let _guard = runtime.enter();
        ShutdownListener::register()
    };

    let config = load_config(args.config.as_deref())?
        .ok_or_else(|| AppError::config(ConfigError::NotFound))?;
    let settings = resolve_settings(args, config)?;
    log_summary(&settings);

    let result = runtime.block_on(run_async(settings, shutdown));
    // Workers are never joined; leave them to the process exit.
    runtime.shutdown_background();
    result
}

fn log_summary(settings: &RunSettings) {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        api = %settings
            .api_addr
            .map_or_else(|| "disabled".to_owned(), |addr| addr.to_string()),
        policy = settings.policy.kind.as_str(),
        targets = settings.targets.len(),
        "Starting zombie"
    );
    for target in &settings.targets {
        let (min, max) = target.sleep_bounds();
        info!(
            target = %target.display_name(),
            url = %target.url,
            delay = ?target.effective_delay(),
            jitter = target.effective_jitter(),
            workers = target.worker_count(),
            sleep = %format!("{:?}..={:?}", min, max),
            "Configured target"
        );
    }
}

async fn run_async(settings: RunSettings, mut shutdown: ShutdownListener) -> AppResult<()> {
    let registry = Arc::new(MetricsRegistry::new()?);
    let workers = plan_workers(&settings.targets, &registry, settings.client_options)?;

    let listener = match settings.api_addr {
        Some(addr) => Some(api::bind(addr).await?),
        None => None,
    };

    let policy = build_policy(settings.policy);
    let (sinks, receivers) = fan_in_channels();
    let mut consumers = spawn_consumers(receivers, &policy);

    if let Some(listener) = listener {
        drop(tokio::spawn(api::serve(listener, Arc::clone(&registry))));
    }

    let spawned = spawn_workers(workers, &sinks);
    drop(sinks);
    info!(workers = spawned, "Probing started");

    tokio::select! {
        signal = shutdown.wait() => {
            info!(signal = signal.as_str(), "Received shutdown signal, exiting");
            Ok(())
        }
        outcome = &mut consumers.errors => outcome_to_result(outcome?, "errors"),
        outcome = &mut consumers.results => outcome_to_result(outcome?, "results"),
    }
}

fn outcome_to_result(outcome: FanInOutcome, channel: &'static str) -> AppResult<()> {
    match outcome {
        FanInOutcome::Terminated(probe_error) => Err(AppError::ProbeFailed {
            target: probe_error.target,
            message: probe_error.message,
        }),
        FanInOutcome::Closed => Err(AppError::FanInClosed { channel }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeError;

    #[test]
    fn terminated_outcome_maps_to_probe_failure() -> Result<(), String> {
        let outcome = FanInOutcome::Terminated(ProbeError::new("foo", "connection refused"));
        match outcome_to_result(outcome, "errors") {
            Err(AppError::ProbeFailed { target, message })
                if target == "foo" && message == "connection refused" =>
            {
                Ok(())
            }
            other => Err(format!("Unexpected result: {:?}", other)),
        }
    }

    #[test]
    fn closed_outcome_is_an_error() -> Result<(), String> {
        match outcome_to_result(FanInOutcome::Closed, "results") {
            Err(AppError::FanInClosed { channel: "results" }) => Ok(()),
            other => Err(format!("Unexpected result: {:?}", other)),
        }
    }
}
