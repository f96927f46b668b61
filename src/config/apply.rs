use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{DEFAULT_API_ADDR, FailurePolicyKind, ZombieArgs, parsers::parse_socket_addr};
use crate::domain::{MAX_WORKERS, Target};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::ClientOptions;

use super::types::{ConfigFile, TargetConfig};

/// Consecutive failures tolerated per target when the budget policy is
/// selected without an explicit limit.
pub const DEFAULT_FAILURE_BUDGET: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySettings {
    pub kind: FailurePolicyKind,
    pub max_consecutive_failures: u32,
}

/// Validated, immutable inputs for one run.
#[derive(Debug)]
pub struct RunSettings {
    pub targets: Vec<Arc<Target>>,
    pub api_addr: Option<SocketAddr>,
    pub client_options: ClientOptions,
    pub policy: PolicySettings,
}

/// Merges CLI overrides into the loaded config and validates the result.
///
/// Target URLs are only checked for emptiness here; parsing them is left to
/// worker construction.
///
/// # Errors
///
/// Returns an error when the config has no targets, a target is invalid, or
/// the policy/API settings are malformed.
pub fn resolve_settings(args: &ZombieArgs, config: ConfigFile) -> AppResult<RunSettings> {
    if config.targets.is_empty() {
        return Err(AppError::validation(ValidationError::NoTargets));
    }

    let mut targets = Vec::with_capacity(config.targets.len());
    for (index, target_config) in config.targets.into_iter().enumerate() {
        targets.push(Arc::new(resolve_target(index, target_config)?));
    }

    let api_addr = match args.api_addr {
        Some(addr) => Some(addr),
        None => match config.api {
            Some(api) if api.enabled => Some(parse_socket_addr(
                api.addr.as_deref().unwrap_or(DEFAULT_API_ADDR),
            )?),
            Some(_) | None => None,
        },
    };

    let policy_config = config.policy.unwrap_or_default();
    let kind = args
        .failure_policy
        .or(policy_config.mode)
        .unwrap_or_default();
    let max_consecutive_failures = args
        .max_consecutive_failures
        .or(policy_config.max_consecutive_failures)
        .unwrap_or(DEFAULT_FAILURE_BUDGET);
    if max_consecutive_failures == 0 {
        return Err(AppError::validation(ValidationError::FailureBudgetZero));
    }

    Ok(RunSettings {
        targets,
        api_addr,
        client_options: ClientOptions {
            insecure: args.insecure || config.insecure.unwrap_or(false),
        },
        policy: PolicySettings {
            kind,
            max_consecutive_failures,
        },
    })
}

fn resolve_target(index: usize, config: TargetConfig) -> AppResult<Target> {
    if config.url.trim().is_empty() {
        return Err(AppError::validation(ValidationError::EmptyUrl { index }));
    }

    let mut target = Target::new(config.url);
    target.name = config.name;
    target.trace_header = config.trace_header.filter(|name| !name.trim().is_empty());
    target.delay = Duration::from_millis(config.delay.unwrap_or(0));
    target.workers = config.workers.unwrap_or(1);
    if target.workers > MAX_WORKERS {
        return Err(AppError::validation(ValidationError::TooManyWorkers {
            target: target.display_name().to_owned(),
            workers: target.workers,
            max: MAX_WORKERS,
        }));
    }

    let jitter = config.jitter.unwrap_or(0.0);
    if !jitter.is_finite() || !(0.0..=1.0).contains(&jitter) {
        return Err(AppError::validation(ValidationError::JitterOutOfRange {
            target: target.display_name().to_owned(),
            jitter,
        }));
    }
    target.jitter = jitter;

    if let Some(headers) = config.headers {
        for (name, values) in headers {
            for value in values.values() {
                target.headers.push((name.clone(), value.clone()));
            }
        }
    }

    Ok(target)
}
