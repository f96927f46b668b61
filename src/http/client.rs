use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::Target;
use crate::error::{HttpError, TransportError};
use crate::metrics::{MetricsRegistry, TargetMetrics};

use super::chain::{Interceptor, Transport, build_chain};
use super::dns::TimingResolver;
use super::interceptors::{DurationInterceptor, InFlightInterceptor, RequestCounterInterceptor};

/// Upper bound on one probe, body included.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Client settings shared by every target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Accept invalid TLS certificates and hostnames.
    pub insecure: bool,
}

/// Terminal transport: hands the request to a real `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.client
            .execute(request)
            .await
            .map_err(TransportError::from_request)
    }
}

/// The full interceptor chain for one target plus its metric handles.
///
/// Cloning is cheap; every worker of a target holds a clone of the same
/// chain and connection pool.
#[derive(Clone)]
pub struct InstrumentedClient {
    transport: Arc<dyn Transport>,
    metrics: TargetMetrics,
}

impl InstrumentedClient {
    /// Builds the instrumented client for `target`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn for_target(
        target: &Target,
        registry: &MetricsRegistry,
        options: ClientOptions,
    ) -> Result<Self, HttpError> {
        let metrics = registry.for_target(target.display_name());

        let mut client_builder = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .dns_resolver(Arc::new(TimingResolver::new(metrics.clone())));

        if options.insecure {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = client_builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed {
                target: target.display_name().to_owned(),
                source: err,
            })?;

        Ok(Self::with_transport(
            Arc::new(ReqwestTransport::new(client)),
            metrics,
        ))
    }

    /// Wraps an arbitrary base transport in the standard interceptors:
    /// in-flight gauge, request counter, then duration histogram.
    #[must_use]
    pub fn with_transport(base: Arc<dyn Transport>, metrics: TargetMetrics) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(InFlightInterceptor::new(metrics.clone())),
            Arc::new(RequestCounterInterceptor::new(metrics.clone())),
            Arc::new(DurationInterceptor::new(metrics.clone())),
        ];
        Self {
            transport: build_chain(base, interceptors),
            metrics,
        }
    }

    /// Sends `request` through the chain.
    ///
    /// # Errors
    ///
    /// Returns the innermost transport's error unchanged.
    pub async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        self.transport.send(request).await
    }

    #[must_use]
    pub const fn metrics(&self) -> &TargetMetrics {
        &self.metrics
    }
}
