//! Immutable probe descriptors shared by the scheduler and its workers.
mod target;

pub use target::{DEFAULT_DELAY, DEFAULT_JITTER, MAX_WORKERS, Target};
