use std::net::SocketAddr;

use clap::Parser;

use super::parsers::{parse_failure_budget, parse_socket_addr};
use super::types::{FailurePolicyKind, LogFormat};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Natural load generator - probes HTTP targets at jittered intervals to simulate real-life traffic."
)]
pub struct ZombieArgs {
    /// The location of the config file (.toml or .json)
    #[arg(long = "config", short = 'c', env = "ZOMBIE_CONFIG")]
    pub config: Option<String>,

    /// Log output format
    #[arg(long = "format", value_enum, default_value_t = LogFormat::Logfmt)]
    pub log_format: LogFormat,

    /// Suppress colors from the output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Accept invalid TLS certificates and hostnames on every target
    #[arg(long = "insecure")]
    pub insecure: bool,

    /// What to do when a probe fails (overrides [policy].mode)
    #[arg(long = "failure-policy", value_enum)]
    pub failure_policy: Option<FailurePolicyKind>,

    /// Consecutive failures tolerated per target under the budget policy
    #[arg(long = "max-consecutive-failures", value_parser = parse_failure_budget)]
    pub max_consecutive_failures: Option<u32>,

    /// Serve Prometheus metrics on this address (enables the API)
    #[arg(long = "api-addr", value_parser = parse_socket_addr)]
    pub api_addr: Option<SocketAddr>,
}
