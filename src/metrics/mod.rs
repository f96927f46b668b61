//! Process-wide probe metrics backed by an explicit Prometheus registry.
mod registry;


pub use registry::{DNS_BUCKETS, MetricsRegistry, TargetMetrics};
