use futures_util::StreamExt;
use reqwest::Response;

use crate::error::TransportError;

/// Reads the response body to the end and returns its size in bytes.
///
/// # Errors
///
/// Returns an error when a chunk cannot be read; a read cut short by the
/// request timeout is reported as a timeout.
pub async fn drain_response_body(response: Response) -> Result<u64, TransportError> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout { source: err }
            } else {
                TransportError::Body { source: err }
            }
        })?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
