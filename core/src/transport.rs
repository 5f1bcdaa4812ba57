//! Pluggable HTTP transport.
//!
//! The client only needs "send this GET, give me status and body". Anything
//! that can do that (a hardened agent with retries, a recording fake in
//! tests) implements `Transport` and is injected through
//! `ClientOption::Transport`. `UreqTransport` is the default.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// A failure that prevented an HTTP response from being received: DNS,
/// connection, TLS, timeout, or a body that could not be read.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TransportError {
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Whether the underlying ureq error was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.source.downcast_ref::<ureq::Error>(),
            Some(ureq::Error::Timeout(_))
        )
    }
}

/// Executes a single GET request.
///
/// Implementations are shared across threads by one client, so they must be
/// safe for concurrent use. A non-2xx status is a normal `HttpResponse`, not
/// an error. `HttpRequest::timeout`, when set, bounds that request alone.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `timeout` bounds the whole call, from resolving to reading the body.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a caller-configured agent. It must not turn HTTP statuses into
    /// errors, or non-200 responses surface as transport errors.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.get(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.config().timeout_global(Some(timeout)).build();
        }

        let mut response = builder.call().map_err(TransportError::new)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            url: request.url.to_string(),
            status,
            body,
        })
    }
}
