use std::time::Duration;

use http::Method;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder, core::Collector,
};

use crate::error::MetricsError;

const IN_FLIGHT: &str = "client_in_flight_requests";
const REQUESTS_TOTAL: &str = "client_api_requests_total";
const REQUEST_DURATION: &str = "request_duration_seconds";
const DNS_DURATION: &str = "dns_duration_seconds";

/// Histogram buckets for DNS lookups, in seconds.
pub const DNS_BUCKETS: [f64; 4] = [0.005, 0.01, 0.025, 0.05];

/// Owns every metric family the probes write to.
///
/// Built once at startup and shared behind `Arc`; there is no global
/// registry. All handles are internally synchronized.
pub struct MetricsRegistry {
    registry: Registry,
    in_flight: IntGaugeVec,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    dns_duration: HistogramVec,
}

impl MetricsRegistry {
    /// Creates and registers the probe metric families.
    ///
    /// # Errors
    ///
    /// Returns an error when a family cannot be created or registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let in_flight = IntGaugeVec::new(
            Opts::new(IN_FLIGHT, "A gauge of in-flight requests for the wrapped client."),
            &["target"],
        )
        .map_err(|err| register_error(IN_FLIGHT, err))?;
        let requests_total = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, "A counter for requests from the wrapped client."),
            &["target", "code", "method"],
        )
        .map_err(|err| register_error(REQUESTS_TOTAL, err))?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION, "A histogram of request latencies."),
            &["target"],
        )
        .map_err(|err| register_error(REQUEST_DURATION, err))?;
        let dns_duration = HistogramVec::new(
            HistogramOpts::new(DNS_DURATION, "Trace dns latency histogram.")
                .buckets(DNS_BUCKETS.to_vec()),
            &["target", "event"],
        )
        .map_err(|err| register_error(DNS_DURATION, err))?;

        register(&registry, IN_FLIGHT, &in_flight)?;
        register(&registry, REQUESTS_TOTAL, &requests_total)?;
        register(&registry, REQUEST_DURATION, &request_duration)?;
        register(&registry, DNS_DURATION, &dns_duration)?;

        Ok(Self {
            registry,
            in_flight,
            requests_total,
            request_duration,
            dns_duration,
        })
    }

    /// Handles pre-bound to one target's label.
    ///
    /// Creating the handles materializes the target's gauge and latency
    /// series so they are exported before the first request completes.
    #[must_use]
    pub fn for_target(&self, target: &str) -> TargetMetrics {
        TargetMetrics {
            target: target.to_owned(),
            in_flight: self.in_flight.with_label_values(&[target]),
            requests_total: self.requests_total.clone(),
            request_duration: self.request_duration.with_label_values(&[target]),
            dns_duration: self.dns_duration.clone(),
        }
    }

    /// Encodes every family in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error when encoding fails.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|err| MetricsError::Encode { source: err })?;
        String::from_utf8(buffer).map_err(|err| MetricsError::Utf8 { source: err })
    }

    #[must_use]
    pub fn content_type() -> String {
        TextEncoder::new().format_type().to_owned()
    }
}

/// Cheap, cloneable view of the metrics for a single target.
#[derive(Clone)]
pub struct TargetMetrics {
    target: String,
    in_flight: IntGauge,
    requests_total: IntCounterVec,
    request_duration: Histogram,
    dns_duration: HistogramVec,
}

impl TargetMetrics {
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn in_flight(&self) -> &IntGauge {
        &self.in_flight
    }

    pub fn record_request(&self, code: u16, method: &Method) {
        let code = code.to_string();
        self.requests_total
            .with_label_values(&[self.target.as_str(), code.as_str(), method.as_str()])
            .inc();
    }

    pub fn observe_duration(&self, elapsed: Duration) {
        self.request_duration.observe(elapsed.as_secs_f64());
    }

    pub fn observe_dns(&self, event: &str, elapsed: Duration) {
        self.dns_duration
            .with_label_values(&[self.target.as_str(), event])
            .observe(elapsed.as_secs_f64());
    }

    #[must_use]
    pub fn in_flight_value(&self) -> i64 {
        self.in_flight.get()
    }

    #[must_use]
    pub fn request_count(&self, code: u16, method: &Method) -> u64 {
        let code = code.to_string();
        self.requests_total
            .with_label_values(&[self.target.as_str(), code.as_str(), method.as_str()])
            .get()
    }

    #[must_use]
    pub fn duration_samples(&self) -> u64 {
        self.request_duration.get_sample_count()
    }

    #[must_use]
    pub fn duration_sum(&self) -> f64 {
        self.request_duration.get_sample_sum()
    }

    #[must_use]
    pub fn dns_samples(&self, event: &str) -> u64 {
        self.dns_duration
            .with_label_values(&[self.target.as_str(), event])
            .get_sample_count()
    }
}

impl std::fmt::Debug for TargetMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetMetrics")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<(), MetricsError>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|err| register_error(name, err))
}

const fn register_error(name: &'static str, source: prometheus::Error) -> MetricsError {
    MetricsError::Register { name, source }
}
