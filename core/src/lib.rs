//! Synchronous client for the what3words v3 API.
//!
//! # Overview
//! Converts coordinates to three-word addresses and back, lists available
//! languages, fetches grid sections and auto-suggests addresses. Each call
//! is one GET with an `X-Api-Key` header, decoded from JSON into typed
//! values.
//!
//! # Design
//! - `What3WordsClient` holds the key, default language, endpoint and a
//!   shared `Transport`; it is immutable after construction and safe to
//!   share across threads.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`); the `What3Words` trait runs
//!   both around a single `Transport::send`.
//! - Errors carry the failed operation as context; see [`Error`].
//! - `What3WordsClient::with_timeout` gives a single call its own deadline
//!   without touching other calls on the same client.
//!
//! ```no_run
//! use w3w_core::{ClientOption, Coordinates, What3Words, What3WordsClient};
//!
//! let client = What3WordsClient::new("YOUR-API-KEY", [ClientOption::language("en")]);
//! let location = client.convert_to_3wa(Coordinates::new(51.520847, -0.195521))?;
//! println!("{}", location.words);
//! # Ok::<(), w3w_core::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{TimedClient, What3Words, What3WordsClient};
pub use config::{ClientConfig, ClientOption};
pub use error::{ApiError, ConfigError, Error, Operation, ServiceErrorDetail};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    AutoSuggestInput, AutoSuggestResponse, AvailableLanguages, BoundingBox, ClipFilter,
    CoordinateRadius, Coordinates, GridLine, GridSection, Language, LocationResponse,
    PolygonCoordinates, Square, Suggestion, MAX_POLYGON_POINTS,
};
