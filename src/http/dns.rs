use std::net::SocketAddr;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tokio::time::Instant;

use crate::metrics::TargetMetrics;

/// `event` label recorded once a lookup has completed.
pub const DNS_DONE: &str = "dns_done";

/// System resolver that records lookup latency in `dns_duration_seconds`.
pub struct TimingResolver {
    metrics: TargetMetrics,
}

impl TimingResolver {
    #[must_use]
    pub const fn new(metrics: TargetMetrics) -> Self {
        Self { metrics }
    }
}

impl Resolve for TimingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let metrics = self.metrics.clone();
        Box::pin(async move {
            let start = Instant::now();
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((name.as_str(), 0))
                .await?
                .collect();
            metrics.observe_dns(DNS_DONE, start.elapsed());
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
