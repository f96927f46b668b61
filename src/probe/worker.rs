use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::Target;
use crate::error::{HttpError, TransportError};
use crate::fanin::ProbeSinks;
use crate::http::{InstrumentedClient, drain_response_body};

use super::jitter::jitter;
use super::types::{ProbeError, ProbeResult};

/// One replica probing one target forever.
pub struct ProbeWorker {
    target: Arc<Target>,
    replica: usize,
    client: InstrumentedClient,
    template: Request,
    trace_header: Option<HeaderName>,
}

impl ProbeWorker {
    /// Validates the target and builds the fixed request template.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL, a header name or a header value is
    /// invalid.
    pub fn new(
        target: Arc<Target>,
        client: InstrumentedClient,
        replica: usize,
    ) -> Result<Self, HttpError> {
        let url = Url::parse(&target.url).map_err(|err| HttpError::InvalidUrl {
            target: target.display_name().to_owned(),
            url: target.url.clone(),
            source: err,
        })?;

        let mut template = Request::new(Method::GET, url);
        for (name, value) in &target.headers {
            let header_name = parse_header_name(&target, name)?;
            let header_value =
                HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeaderValue {
                    target: target.display_name().to_owned(),
                    name: name.clone(),
                    source: err,
                })?;
            template.headers_mut().append(header_name, header_value);
        }

        let trace_header = match target.trace_header.as_deref() {
            Some(name) => Some(parse_header_name(&target, name)?),
            None => None,
        };

        Ok(Self {
            target,
            replica,
            client,
            template,
            trace_header,
        })
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub const fn replica(&self) -> usize {
        self.replica
    }

    #[must_use]
    pub const fn template(&self) -> &Request {
        &self.template
    }

    /// Sends one clone of the template and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the request, or reading its body, fails.
    pub async fn probe_once(&self) -> Result<ProbeResult, ProbeError> {
        let name = self.target.display_name();
        let request = self
            .template
            .try_clone()
            .ok_or_else(|| ProbeError::from_transport(name, &TransportError::TemplateClone))?;

        let start = Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| ProbeError::from_transport(name, &err))?;

        let status = response.status();
        let trace_id = self
            .trace_header
            .as_ref()
            .and_then(|header| response.headers().get(header))
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        drain_response_body(response)
            .await
            .map_err(|err| ProbeError::from_transport(name, &err))?;

        Ok(ProbeResult {
            target: name.to_owned(),
            method: self.template.method().clone(),
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            url: self.template.url().to_string(),
            latency: start.elapsed(),
            trace_id,
        })
    }

    /// Sleep, probe, emit; until a sink is closed.
    pub async fn run(self, sinks: ProbeSinks) {
        let delay = self.target.effective_delay();
        let fraction = self.target.effective_jitter();
        loop {
            tokio::time::sleep(jitter(delay, fraction)).await;

            let delivered = match self.probe_once().await {
                Ok(result) => sinks.results.send(result).await,
                Err(err) => sinks.errors.send(err).await,
            };
            if delivered.is_err() {
                debug!(
                    target = %self.target.display_name(),
                    replica = self.replica,
                    "Fan-in closed, stopping worker"
                );
                break;
            }
        }
    }
}

fn parse_header_name(target: &Target, name: &str) -> Result<HeaderName, HttpError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|err| HttpError::InvalidHeaderName {
        target: target.display_name().to_owned(),
        name: name.to_owned(),
        source: err,
    })
}
