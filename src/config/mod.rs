//! Configuration loading and resolution into run settings.
mod apply;
mod loader;
pub mod types;


pub use apply::{DEFAULT_FAILURE_BUDGET, PolicySettings, RunSettings, resolve_settings};
pub use loader::{load_config, load_config_str};

#[cfg(test)]
pub(crate) use loader::load_config_file;
