//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::ZombieArgs;
pub use types::{FailurePolicyKind, LogFormat};

pub(crate) use defaults::{DEFAULT_API_ADDR, DEFAULT_CONFIG_FILES, DEFAULT_USER_AGENT};
