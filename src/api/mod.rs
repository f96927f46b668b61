//! Minimal HTTP endpoint exposing the probe metrics to Prometheus.
mod http;


use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, MetricsError};
use crate::metrics::MetricsRegistry;

use self::http::{read_http_request, write_response};

/// How long a client may take to send its request head.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

const INDEX_HTML: &str = "<html><head><title>zombie</title></head><body><h1>zombie</h1><p><a href=\"/metrics\">Metrics</a></p></body></html>";

/// Binds the metrics listener.
///
/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> AppResult<TcpListener> {
    TcpListener::bind(addr).await.map_err(|err| {
        AppError::metrics(MetricsError::Io {
            context: "bind metrics endpoint",
            source: err,
        })
    })
}

/// Serves `/metrics` on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, registry: Arc<MetricsRegistry>) {
    serve_with_timeout(listener, registry, REQUEST_READ_TIMEOUT).await;
}

async fn serve_with_timeout(
    listener: TcpListener,
    registry: Arc<MetricsRegistry>,
    read_timeout: Duration,
) {
    if let Ok(addr) = listener.local_addr() {
        info!("Serving metrics on http://{}/metrics", addr);
    }
    loop {
        let (socket, _) = match listener.accept().await {
            Ok(result) => result,
            Err(err) => {
                warn!("Failed to accept metrics connection: {}", err);
                continue;
            }
        };
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(socket, &registry, read_timeout).await {
                debug!("Metrics connection ended early: {}", err);
            }
        });
    }
}

async fn handle_connection(
    mut socket: TcpStream,
    registry: &MetricsRegistry,
    read_timeout: Duration,
) -> Result<(), MetricsError> {
    let request = match tokio::time::timeout(read_timeout, read_http_request(&mut socket)).await {
        Ok(Ok(request)) => request,
        Ok(Err(err)) => {
            return write_response(
                &mut socket,
                err.status,
                "text/plain; charset=utf-8",
                err.message.as_bytes(),
            )
            .await;
        }
        Err(_) => {
            debug!("Metrics client sent no request within {:?}", read_timeout);
            return write_response(
                &mut socket,
                408,
                "text/plain; charset=utf-8",
                b"Request Timeout",
            )
            .await;
        }
    };

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/metrics") => match registry.render() {
            Ok(body) => {
                write_response(
                    &mut socket,
                    200,
                    &MetricsRegistry::content_type(),
                    body.as_bytes(),
                )
                .await
            }
            Err(err) => {
                warn!("Failed to render metrics: {}", err);
                write_response(
                    &mut socket,
                    500,
                    "text/plain; charset=utf-8",
                    err.to_string().as_bytes(),
                )
                .await
            }
        },
        ("GET", "/") => {
            write_response(
                &mut socket,
                200,
                "text/html; charset=utf-8",
                INDEX_HTML.as_bytes(),
            )
            .await
        }
        _ => {
            write_response(
                &mut socket,
                404,
                "text/plain; charset=utf-8",
                b"Not Found",
            )
            .await
        }
    }
}
