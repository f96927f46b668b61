//! Jittered per-target probe workers and the scheduler that spawns them.
mod jitter;
mod scheduler;
mod types;
mod worker;

#[cfg(test)]
mod tests;

pub use jitter::{jitter, jitter_bounds, jitter_with};
pub use scheduler::{plan_workers, spawn_workers};
pub use types::{ProbeError, ProbeResult};
pub use worker::ProbeWorker;
