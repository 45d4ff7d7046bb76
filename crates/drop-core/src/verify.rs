//! Round-trip verification: fetch the public URL and compare bytes.
//!
//! Uses the curl crate (libcurl) with bounded connect and total timeouts.

use chrono::{DateTime, Local};
use std::time::Duration;

use crate::error::{DropError, VerificationFailure};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Extension forced on self-test uploads.
pub const SELF_TEST_EXTENSION: &str = "test";

/// Retrieves the body served at a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DropError>;
}

/// Blocking HTTP(S) GET with redirects followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlFetcher;

fn fetch_error(msg: impl Into<String>) -> DropError {
    DropError::Verification(VerificationFailure::Fetch(msg.into()))
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DropError> {
        let parsed = url::Url::parse(url).map_err(|e| fetch_error(format!("invalid url {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(fetch_error(format!(
                "cannot fetch {}: only http and https are supported",
                url
            )));
        }

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        let curl_err = |e: curl::Error| fetch_error(format!("GET {}: {}", url, e));
        easy.url(url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.connect_timeout(CONNECT_TIMEOUT).map_err(curl_err)?;
        easy.timeout(FETCH_TIMEOUT).map_err(curl_err)?;
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let code = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&code) {
            return Err(fetch_error(format!("GET {} returned HTTP {}", url, code)));
        }
        tracing::debug!(url, len = body.len(), "fetched verification body");
        Ok(body)
    }
}

/// Payload uploaded by self-test mode: `TEST <local timestamp>\n`.
pub fn self_test_payload(now: DateTime<Local>) -> Vec<u8> {
    format!("TEST {}\n", now.format("%Y-%m-%d %H:%M:%S%.6f")).into_bytes()
}

/// Byte-for-byte comparison of fetched and expected content.
pub fn compare(expected: &[u8], actual: &[u8]) -> Result<(), DropError> {
    if expected == actual {
        return Ok(());
    }
    let first_difference = expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b);
    Err(DropError::Verification(VerificationFailure::Mismatch {
        expected_len: expected.len(),
        actual_len: actual.len(),
        first_difference,
    }))
}

/// Fetch `url` and require it to serve exactly `expected`.
pub fn verify(fetcher: &dyn Fetcher, url: &str, expected: &[u8]) -> Result<(), DropError> {
    let actual = fetcher.fetch(url)?;
    compare(expected, &actual)
}
