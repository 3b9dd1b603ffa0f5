use reqwest::blocking::Client;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadAt;

/// HTTP Range reader for remote PACK archives
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
}

impl HttpRangeReader {
    /// Create a new HTTP Range reader
    ///
    /// This will send a HEAD request to verify Range support and get file size
    pub fn new(url: String) -> io::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(io::Error::other)?;

        // Send HEAD request to check capabilities
        let resp = client.head(&url).send().map_err(io::Error::other)?;

        if !resp.status().is_success() {
            return Err(io::Error::other(format!(
                "HTTP request failed with status: {}",
                resp.status()
            )));
        }

        // Check if server supports Range requests
        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");

        if !accept_ranges.contains("bytes") {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Remote server does not support Range requests",
            ));
        }

        // Get file size from Content-Length
        let size = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| io::Error::other("Remote server did not return Content-Length"))?;

        tracing::debug!(%url, size, "opened remote archive");

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

/// Inclusive `Range` header value for `len` bytes at `offset`, clamped to the
/// object size. `None` when nothing of the request lies inside the object.
fn range_header(offset: u64, len: usize, size: u64) -> Option<String> {
    if len == 0 || offset >= size {
        return None;
    }
    let end = (offset + len as u64 - 1).min(size - 1);
    Some(format!("bytes={}-{}", offset, end))
}

impl ReadAt for HttpRangeReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Some(range) = range_header(offset, buf.len(), self.size) else {
            return Ok(0);
        };

        tracing::trace!(url = %self.url, %range, "range request");

        let resp = self
            .client
            .get(&self.url)
            .header("Range", &range)
            .send()
            .map_err(io::Error::other)?;

        if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
            return Err(io::Error::other(format!(
                "HTTP request failed with status: {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().map_err(io::Error::other)?;
        let chunk_len = bytes.len().min(buf.len());
        buf[..chunk_len].copy_from_slice(&bytes[..chunk_len]);

        self.transferred_bytes
            .fetch_add(chunk_len as u64, Ordering::Relaxed);

        Ok(chunk_len)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive_and_clamped() {
        assert_eq!(range_header(0, 12, 100).as_deref(), Some("bytes=0-11"));
        assert_eq!(range_header(90, 64, 100).as_deref(), Some("bytes=90-99"));
    }

    #[test]
    fn no_range_outside_object() {
        assert_eq!(range_header(100, 4, 100), None);
        assert_eq!(range_header(10, 0, 100), None);
    }
}
