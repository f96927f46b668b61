//! Small local web server to point `zombie` at during development.
use std::net::SocketAddr;

use clap::Parser;
use rand::Rng;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use zombie::args::LogFormat;
use zombie::error::AppResult;

const MAX_REQUEST_BYTES: usize = 64 * 1024;
const BODY: &str = "Hello, World";

#[derive(Debug, Parser)]
#[clap(version, about = "Serves `Hello, World` with a random trace id on every response.")]
struct DevArgs {
    /// Address to listen on
    #[arg(long = "addr", short = 'a', default_value = "0.0.0.0:8080", env = "ZOMBIE_DEV_ADDR")]
    addr: SocketAddr,

    /// Response header carrying the random trace id
    #[arg(long = "trace-header", default_value = "X-Trace-Id")]
    trace_header: String,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,
}

fn main() -> AppResult<()> {
    let args = DevArgs::parse();
    zombie::logger::init_logging(args.verbose, false, LogFormat::Logfmt);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(args))
}

async fn serve(args: DevArgs) -> AppResult<()> {
    let listener = TcpListener::bind(args.addr).await?;
    info!("Dev server listening on http://{}", args.addr);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(result) => result,
            Err(err) => {
                warn!("Failed to accept connection: {}", err);
                continue;
            }
        };
        let trace_header = args.trace_header.clone();
        tokio::spawn(async move {
            match respond(socket, &trace_header).await {
                Ok(Some(path)) => info!(peer = %peer, "200 OK {}", path),
                Ok(None) => {}
                Err(err) => warn!(peer = %peer, "Connection failed: {}", err),
            }
        });
    }
}

async fn respond(mut socket: TcpStream, trace_header: &str) -> std::io::Result<Option<String>> {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|window| window == b"\r\n\r\n") {
        let bytes = socket.read(&mut chunk).await?;
        if bytes == 0 || buffer.len() > MAX_REQUEST_BYTES {
            return Ok(None);
        }
        buffer.extend_from_slice(chunk.get(..bytes).unwrap_or_default());
    }

    let path = String::from_utf8_lossy(&buffer)
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_owned();
    let trace_id: u64 = rand::thread_rng().r#gen();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\n{}: {:016x}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        trace_header,
        trace_id,
        BODY.len(),
        BODY
    );
    socket.write_all(response.as_bytes()).await?;
    Ok(Some(path))
}
