//! Registry fetcher
//!
//! Retrieves the raw `usb.ids` document over HTTP(S). Transient failures
//! (timeouts, connection errors, 5xx) are retried with exponential backoff;
//! anything else fails immediately.

use crate::Result;
use backon::{BlockingRetryable, ExponentialBuilder};
use std::time::Duration;

/// Canonical location of the registry
pub const DEFAULT_SOURCE_URL: &str = "http://www.linux-usb.org/usb.ids";

/// Source of the raw registry text
pub trait Fetcher {
    /// Human-readable label for the source (stored alongside the data)
    fn source(&self) -> &str;

    /// Retrieve the whole document
    fn fetch(&self) -> Result<String>;
}

/// Blocking HTTP fetcher for a fixed URL
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    url: String,
    retry_policy: ExponentialBuilder,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration, max_attempts: usize) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("usbids/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // backon counts retries, not attempts
        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(4))
            .with_max_times(max_attempts.max(1) - 1)
            .with_jitter();

        Ok(Self {
            client,
            url: url.into(),
            retry_policy,
        })
    }

    fn fetch_once(&self) -> std::result::Result<String, reqwest::Error> {
        tracing::debug!("GET {}", self.url);
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        response.text()
    }
}

impl Fetcher for HttpFetcher {
    fn source(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<String> {
        let body = (|| self.fetch_once())
            .retry(self.retry_policy)
            .sleep(std::thread::sleep)
            .when(is_transient)
            .notify(|err: &reqwest::Error, dur: Duration| {
                tracing::warn!("Fetching {} failed ({}), retrying in {:?}", self.url, err, dur);
            })
            .call()?;

        tracing::info!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    err.status().is_some_and(|status| status.is_server_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serve every request with `status_line` and count the requests.
    fn serve_status(status_line: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/usb.ids", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    status_line
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        (url, hits)
    }

    #[test]
    fn test_fetcher_reports_its_source() {
        let fetcher = HttpFetcher::new(DEFAULT_SOURCE_URL, Duration::from_secs(5), 3).unwrap();
        assert_eq!(fetcher.source(), DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_unreachable_source_is_a_network_error() {
        // Port 9 (discard) on localhost is closed on any sane test host.
        let fetcher = HttpFetcher::new("http://127.0.0.1:9/usb.ids", Duration::from_secs(2), 1).unwrap();
        let err = fetcher.fetch().unwrap_err();
        assert!(err.is_network(), "{err}");
    }

    #[test]
    fn test_client_error_status_fails_without_retry() {
        let (url, hits) = serve_status("404 Not Found");
        let fetcher = HttpFetcher::new(url, Duration::from_secs(5), 3).unwrap();

        let err = fetcher.fetch().unwrap_err();
        assert!(err.is_network(), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_server_error_status_is_retried_up_to_max_attempts() {
        let (url, hits) = serve_status("503 Service Unavailable");
        let fetcher = HttpFetcher::new(url, Duration::from_secs(5), 3).unwrap();

        let err = fetcher.fetch().unwrap_err();
        assert!(err.is_network(), "{err}");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
