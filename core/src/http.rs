//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! per operation and parses the `HttpResponse` a transport hands back, so the
//! request encoding and response decoding can be exercised without a
//! network. Every what3words call is a GET, so no method or body is carried.

use std::time::Duration;

use url::Url;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// A GET request described as plain data.
#[derive(Clone)]
pub struct HttpRequest {
    /// Full URL including the encoded query string.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Deadline for this request alone. `None` leaves the transport's own
    /// timeout in charge.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of the query parameter `name`, decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(API_KEY_HEADER) {
                    (k.as_str(), "<redacted>")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// The body is raw bytes and need not be UTF-8.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// URL the response was received from, reported in service errors.
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}
