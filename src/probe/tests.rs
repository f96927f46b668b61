use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderValue, StatusCode};
use reqwest::{Client, Request, Response};

use super::*;
use crate::domain::{MAX_WORKERS, Target};
use crate::error::{AppError, HttpError, TransportError};
use crate::fanin::fan_in_channels;
use crate::http::{ClientOptions, InstrumentedClient, Transport};
use crate::metrics::MetricsRegistry;

const WORKER_TIMEOUT: Duration = Duration::from_secs(2);

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Answers every request with 200 and, optionally, a trace header; echoes
/// the request's `Accept` values back in the body.
struct EchoTransport {
    trace: Option<(&'static str, &'static str)>,
}

#[async_trait]
impl Transport for EchoTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let accept: Vec<String> = request
            .headers()
            .get_all("accept")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();
        let mut response = http::Response::new(accept.join(","));
        *response.status_mut() = StatusCode::OK;
        if let Some((name, value)) = self.trace {
            response
                .headers_mut()
                .insert(name, HeaderValue::from_static(value));
        }
        Ok(Response::from(response))
    }
}

struct RefusingTransport;

#[async_trait]
impl Transport for RefusingTransport {
    async fn send(&self, _request: Request) -> Result<Response, TransportError> {
        match Client::new().get("http://[::1").build() {
            Ok(_) => Err(TransportError::TemplateClone),
            Err(err) => Err(TransportError::from_request(err)),
        }
    }
}

fn client_with(transport: Arc<dyn Transport>) -> Result<InstrumentedClient, String> {
    let registry = MetricsRegistry::new().map_err(|err| err.to_string())?;
    Ok(InstrumentedClient::with_transport(
        transport,
        registry.for_target("foo"),
    ))
}

fn named_target(url: &str) -> Target {
    let mut target = Target::new(url);
    target.name = Some("foo".to_owned());
    target
}

#[test]
fn unparsable_url_fails_at_construction() -> Result<(), String> {
    let client = client_with(Arc::new(RefusingTransport))?;
    match ProbeWorker::new(Arc::new(named_target("http://[::1")), client, 0) {
        Err(HttpError::InvalidUrl { target, .. }) if target == "foo" => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected invalid url to be rejected".to_owned()),
    }
}

#[test]
fn invalid_headers_fail_at_construction() -> Result<(), String> {
    let mut bad_name = named_target("http://foo/");
    bad_name.headers.push(("bad header".to_owned(), "x".to_owned()));
    let client = client_with(Arc::new(RefusingTransport))?;
    if !matches!(
        ProbeWorker::new(Arc::new(bad_name), client.clone(), 0),
        Err(HttpError::InvalidHeaderName { .. })
    ) {
        return Err("Expected invalid header name".to_owned());
    }

    let mut bad_value = named_target("http://foo/");
    bad_value
        .headers
        .push(("X-Test".to_owned(), "line\nbreak".to_owned()));
    if !matches!(
        ProbeWorker::new(Arc::new(bad_value), client.clone(), 0),
        Err(HttpError::InvalidHeaderValue { .. })
    ) {
        return Err("Expected invalid header value".to_owned());
    }

    let mut bad_trace = named_target("http://foo/");
    bad_trace.trace_header = Some("trace id".to_owned());
    if !matches!(
        ProbeWorker::new(Arc::new(bad_trace), client, 0),
        Err(HttpError::InvalidHeaderName { .. })
    ) {
        return Err("Expected invalid trace header".to_owned());
    }
    Ok(())
}

#[test]
fn template_carries_every_header_value() -> Result<(), String> {
    let mut target = named_target("http://foo/");
    target.headers.push(("Accept".to_owned(), "*/*".to_owned()));
    target
        .headers
        .push(("Accept".to_owned(), "text/plain".to_owned()));
    let client = client_with(Arc::new(RefusingTransport))?;
    let worker = ProbeWorker::new(Arc::new(target), client, 3).map_err(|err| err.to_string())?;

    let values: Vec<&str> = worker
        .template()
        .headers()
        .get_all("accept")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    if values != ["*/*", "text/plain"] {
        return Err(format!("Unexpected accept values: {:?}", values));
    }
    if worker.template().method() != reqwest::Method::GET || worker.replica() != 3 {
        return Err("Unexpected template".to_owned());
    }
    Ok(())
}

#[test]
fn trace_header_is_copied_into_result() -> Result<(), String> {
    run_async_test(async {
        let mut target = named_target("http://foo/path");
        target.trace_header = Some("X-Trace-Id".to_owned());
        let client = client_with(Arc::new(EchoTransport {
            trace: Some(("x-trace-id", "abc123")),
        }))?;
        let worker =
            ProbeWorker::new(Arc::new(target), client, 0).map_err(|err| err.to_string())?;

        let result = worker.probe_once().await.map_err(|err| err.to_string())?;
        if result.trace_id != "abc123" {
            return Err(format!("Unexpected trace id: {:?}", result.trace_id));
        }
        if result.status() != "200 OK" || result.url != "http://foo/path" {
            return Err(format!("Unexpected result: {:?}", result));
        }
        if result.target != "foo" || result.method != reqwest::Method::GET {
            return Err(format!("Unexpected result: {:?}", result));
        }
        Ok(())
    })
}

#[test]
fn missing_trace_header_leaves_trace_id_empty() -> Result<(), String> {
    run_async_test(async {
        let mut with_header = named_target("http://foo/");
        with_header.trace_header = Some("X-Trace-Id".to_owned());
        let client = client_with(Arc::new(EchoTransport { trace: None }))?;
        let worker = ProbeWorker::new(Arc::new(with_header), client.clone(), 0)
            .map_err(|err| err.to_string())?;
        let result = worker.probe_once().await.map_err(|err| err.to_string())?;
        if !result.trace_id.is_empty() {
            return Err("Expected empty trace id when header is absent".to_owned());
        }

        let unset = named_target("http://foo/");
        let client = client_with(Arc::new(EchoTransport {
            trace: Some(("x-trace-id", "abc123")),
        }))?;
        let worker =
            ProbeWorker::new(Arc::new(unset), client, 0).map_err(|err| err.to_string())?;
        let result = worker.probe_once().await.map_err(|err| err.to_string())?;
        if !result.trace_id.is_empty() {
            return Err("Expected empty trace id when no header is configured".to_owned());
        }
        Ok(())
    })
}

#[test]
fn transport_failure_becomes_probe_error() -> Result<(), String> {
    run_async_test(async {
        let client = client_with(Arc::new(RefusingTransport))?;
        let worker = ProbeWorker::new(Arc::new(named_target("http://foo/")), client, 0)
            .map_err(|err| err.to_string())?;
        match worker.probe_once().await {
            Err(error) if error.target == "foo" && !error.message.is_empty() => Ok(()),
            Err(error) => Err(format!("Unexpected error: {:?}", error)),
            Ok(result) => Err(format!("Expected failure, got {:?}", result)),
        }
    })
}

#[test]
fn plan_builds_replicas_for_every_target() -> Result<(), String> {
    let registry = MetricsRegistry::new().map_err(|err| err.to_string())?;
    let mut three = Target::new("http://one.test/");
    three.workers = 3;
    let mut zero = Target::new("http://two.test/");
    zero.workers = 0;
    let targets = vec![Arc::new(three), Arc::new(zero)];

    let workers = plan_workers(&targets, &registry, ClientOptions::default())
        .map_err(|err| err.to_string())?;
    if workers.len() != 4 {
        return Err(format!("Expected 4 workers, got {}", workers.len()));
    }
    let replicas: Vec<usize> = workers.iter().map(ProbeWorker::replica).collect();
    if replicas != [0, 1, 2, 0] {
        return Err(format!("Unexpected replicas: {:?}", replicas));
    }
    Ok(())
}

#[test]
fn plan_rejects_bad_target_before_spawning() -> Result<(), String> {
    let registry = MetricsRegistry::new().map_err(|err| err.to_string())?;
    let targets = vec![
        Arc::new(Target::new("http://ok.test/")),
        Arc::new(Target::new("http://[::1")),
    ];
    match plan_workers(&targets, &registry, ClientOptions::default()) {
        Err(AppError::Http(HttpError::InvalidUrl { url, .. })) if url == "http://[::1" => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected planning to fail".to_owned()),
    }
}

#[test]
fn worker_emits_until_fan_in_closes() -> Result<(), String> {
    run_async_test(async {
        let mut target = named_target("http://foo/");
        target.delay = Duration::from_millis(1);
        let client = client_with(Arc::new(EchoTransport { trace: None }))?;
        let worker =
            ProbeWorker::new(Arc::new(target), client, 0).map_err(|err| err.to_string())?;

        let (sinks, mut receivers) = fan_in_channels();
        let handle = tokio::spawn(worker.run(sinks));

        for _ in 0..3 {
            let result = tokio::time::timeout(WORKER_TIMEOUT, receivers.results.recv())
                .await
                .map_err(|err| format!("no result: {}", err))?
                .ok_or("result channel closed")?;
            if result.target != "foo" {
                return Err(format!("Unexpected result: {:?}", result));
            }
        }

        drop(receivers);
        tokio::time::timeout(WORKER_TIMEOUT, handle)
            .await
            .map_err(|err| format!("worker kept running: {}", err))?
            .map_err(|err| format!("worker task failed: {}", err))?;
        Ok(())
    })
}

#[test]
fn spawned_workers_report_failures() -> Result<(), String> {
    run_async_test(async {
        let mut target = named_target("http://foo/");
        target.delay = Duration::from_millis(1);
        let client = client_with(Arc::new(RefusingTransport))?;
        let worker =
            ProbeWorker::new(Arc::new(target), client, 0).map_err(|err| err.to_string())?;

        let (sinks, mut receivers) = fan_in_channels();
        if spawn_workers(vec![worker], &sinks) != 1 {
            return Err("Expected one spawned worker".to_owned());
        }

        let error = tokio::time::timeout(WORKER_TIMEOUT, receivers.errors.recv())
            .await
            .map_err(|err| format!("no error: {}", err))?
            .ok_or("error channel closed")?;
        if error.target != "foo" {
            return Err(format!("Unexpected error: {:?}", error));
        }
        Ok(())
    })
}

#[test]
fn oversized_worker_count_is_capped() -> Result<(), String> {
    let mut target = Target::new("http://foo/");
    target.workers = i64::MAX;
    let expected = usize::try_from(MAX_WORKERS).map_err(|err| err.to_string())?;
    if target.worker_count() != expected {
        return Err(format!("Unexpected worker count: {}", target.worker_count()));
    }
    Ok(())
}

#[test]
fn silent_server_times_out_after_probe_timeout() -> Result<(), String> {
    run_async_test(async {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("local_addr failed: {}", err))?;
        // Accept and hold every connection without ever answering.
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let registry = MetricsRegistry::new().map_err(|err| err.to_string())?;
        let target = Arc::new(named_target(&format!("http://{}/", addr)));
        let client = InstrumentedClient::for_target(&target, &registry, ClientOptions::default())
            .map_err(|err| err.to_string())?;
        let metrics = client.metrics().clone();
        let worker = ProbeWorker::new(target, client, 0).map_err(|err| err.to_string())?;

        let started = tokio::time::Instant::now();
        let outcome = worker.probe_once().await;
        let elapsed = started.elapsed();
        server.abort();

        match outcome {
            Err(error) if error.timed_out && error.target == "foo" => {}
            Err(error) => return Err(format!("Expected a timeout, got {:?}", error)),
            Ok(result) => return Err(format!("Expected a timeout, got {:?}", result)),
        }
        if elapsed < Duration::from_millis(900) || elapsed > Duration::from_millis(2500) {
            return Err(format!("Timed out after {:?}", elapsed));
        }
        if metrics.in_flight_value() != 0 {
            return Err(format!("In-flight gauge stuck at {}", metrics.in_flight_value()));
        }
        if metrics.duration_samples() != 0 {
            return Err("Timed out request should not be observed".to_owned());
        }
        Ok(())
    })
}
