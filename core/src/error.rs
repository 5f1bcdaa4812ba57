//! Error types for the what3words client.
//!
//! # Design
//! `ApiError` classifies what went wrong: a local validation failure, a
//! transport failure, a non-200 status from the service, or a body that did
//! not decode. `Error` pairs that kind with the `Operation` that failed so
//! every message carries a short context prefix, e.g.
//! `retrieving grid section: request for ... returned unexpected status 500 Internal Server Error`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::TransportError;

/// The client operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AutoSuggest,
    AvailableLanguages,
    ConvertTo3wa,
    ConvertToCoordinates,
    GridSection,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = match self {
            Operation::AutoSuggest => "retrieving auto suggestion",
            Operation::AvailableLanguages => "retrieving available languages",
            Operation::ConvertTo3wa => "converting coordinates to address",
            Operation::ConvertToCoordinates => "converting address to coordinates",
            Operation::GridSection => "retrieving grid section",
        };
        f.write_str(context)
    }
}

/// Structured error reported by the service in its error envelope,
/// `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorDetail {
    pub code: String,
    pub message: String,
}

/// Errors produced while building, sending, or parsing a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The input was rejected locally; no request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The request never produced an HTTP response.
    #[error("sending HTTP request: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a status other than 200.
    #[error("request for {url} returned unexpected status {status} {reason}")]
    Service {
        url: String,
        status: u16,
        reason: String,
        /// Present when the body carried the service's error envelope.
        detail: Option<ServiceErrorDetail>,
    },

    /// The 200 response body did not match the expected shape.
    #[error("decoding response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// An `ApiError` tagged with the operation that produced it.
#[derive(Debug, Error)]
#[error("{operation}: {source}")]
pub struct Error {
    operation: Operation,
    #[source]
    source: ApiError,
}

impl Error {
    pub fn new(operation: Operation, source: ApiError) -> Self {
        Self { operation, source }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn kind(&self) -> &ApiError {
        &self.source
    }

    pub fn into_kind(self) -> ApiError {
        self.source
    }

    /// HTTP status of a service error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match &self.source {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}
