use async_trait::async_trait;
use prometheus::IntGauge;
use reqwest::{Request, Response};
use tokio::time::Instant;

use crate::error::TransportError;
use crate::metrics::TargetMetrics;

use super::chain::{Interceptor, Transport};

/// Holds one unit of the in-flight gauge until dropped.
pub(super) struct InFlightGuard<'gauge> {
    gauge: &'gauge IntGauge,
}

impl<'gauge> InFlightGuard<'gauge> {
    pub(super) fn acquire(gauge: &'gauge IntGauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

/// Tracks `client_in_flight_requests` around every request.
pub struct InFlightInterceptor {
    metrics: TargetMetrics,
}

impl InFlightInterceptor {
    #[must_use]
    pub const fn new(metrics: TargetMetrics) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Interceptor for InFlightInterceptor {
    async fn intercept(
        &self,
        request: Request,
        next: &dyn Transport,
    ) -> Result<Response, TransportError> {
        let _in_flight = InFlightGuard::acquire(self.metrics.in_flight());
        next.send(request).await
    }
}

/// Counts successful round trips in `client_api_requests_total`.
pub struct RequestCounterInterceptor {
    metrics: TargetMetrics,
}

impl RequestCounterInterceptor {
    #[must_use]
    pub const fn new(metrics: TargetMetrics) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Interceptor for RequestCounterInterceptor {
    async fn intercept(
        &self,
        request: Request,
        next: &dyn Transport,
    ) -> Result<Response, TransportError> {
        let method = request.method().clone();
        let response = next.send(request).await?;
        self.metrics
            .record_request(response.status().as_u16(), &method);
        Ok(response)
    }
}

/// Observes `request_duration_seconds` for successful round trips.
pub struct DurationInterceptor {
    metrics: TargetMetrics,
}

impl DurationInterceptor {
    #[must_use]
    pub const fn new(metrics: TargetMetrics) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Interceptor for DurationInterceptor {
    async fn intercept(
        &self,
        request: Request,
        next: &dyn Transport,
    ) -> Result<Response, TransportError> {
        let start = Instant::now();
        let response = next.send(request).await?;
        self.metrics.observe_duration(start.elapsed());
        Ok(response)
    }
}
