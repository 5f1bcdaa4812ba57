//! Request building, response parsing and execution for the what3words API.
//!
//! # Design
//! Every operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Both halves are pure, so encoding rules are testable without a network.
//! The `What3Words` implementation glues them together around one
//! `Transport::send` call and tags failures with the operation name.
//!
//! `What3WordsClient` is immutable after construction; all per-call state
//! lives on the stack, so one client can be shared across threads. A
//! per-call deadline is set through `with_timeout`, which borrows the client
//! and stamps the deadline onto each request it sends.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, ClientOption};
use crate::error::{ApiError, ConfigError, Error, Operation, ServiceErrorDetail};
use crate::http::{HttpRequest, HttpResponse, API_KEY_HEADER, CONTENT_TYPE_HEADER};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AutoSuggestInput, AutoSuggestResponse, AvailableLanguages, BoundingBox, ClipFilter,
    Coordinates, GridSection, Language, LocationResponse, MAX_POLYGON_POINTS,
};

/// The five what3words operations.
pub trait What3Words {
    /// Suggest three-word addresses for a full or partial address.
    fn autosuggest(&self, input: &AutoSuggestInput) -> Result<AutoSuggestResponse, Error>;

    /// All languages addresses can be returned in, in service order.
    fn available_languages(&self) -> Result<Vec<Language>, Error>;

    /// Convert coordinates to the three-word address of their square.
    fn convert_to_3wa(&self, coordinates: Coordinates) -> Result<LocationResponse, Error>;

    /// Convert a three-word address to the coordinates of its square.
    fn convert_to_coordinates(&self, words: &str) -> Result<LocationResponse, Error>;

    /// Grid lines covering `bounding_box`, for drawing onto a map.
    fn grid_section(&self, bounding_box: BoundingBox) -> Result<GridSection, Error>;
}

#[derive(Clone)]
pub struct What3WordsClient {
    api_key: String,
    language: String,
    endpoint: Url,
    transport: Arc<dyn Transport>,
}

impl What3WordsClient {
    /// Create a client for `api_key`, applying `options` in order over the
    /// defaults.
    ///
    /// The key is not checked here; a bad or empty key shows up as a 401
    /// service error on the first call.
    pub fn new(api_key: impl Into<String>, options: impl IntoIterator<Item = ClientOption>) -> Self {
        Self::from_config(ClientConfig::new(api_key).with_options(options))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = match config.transport {
            Some(transport) => transport,
            None => Arc::new(UreqTransport::with_timeout(config.timeout)),
        };
        Self {
            api_key: config.api_key,
            language: config.language,
            endpoint: config.endpoint,
            transport,
        }
    }

    /// Build a client from `W3W_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfig::from_env().map(Self::from_config)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// A view of this client whose calls each give up after `timeout`.
    ///
    /// Other calls on the same client are unaffected. An elapsed deadline is
    /// an `ApiError::Transport` for that call.
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use w3w_core::{What3Words, What3WordsClient};
    ///
    /// let client = What3WordsClient::new("YOUR-API-KEY", []);
    /// let languages = client.with_timeout(Duration::from_secs(2)).available_languages()?;
    /// # Ok::<(), w3w_core::Error>(())
    /// ```
    pub fn with_timeout(&self, timeout: Duration) -> TimedClient<'_> {
        TimedClient {
            client: self,
            timeout,
        }
    }

    pub fn build_autosuggest(&self, input: &AutoSuggestInput) -> Result<HttpRequest, ApiError> {
        if let Some(ClipFilter::Polygon(polygon)) = &input.clip {
            if polygon.len() > MAX_POLYGON_POINTS {
                return Err(ApiError::Validation(format!(
                    "clip to polygon is limited to {MAX_POLYGON_POINTS} coordinate pairs, got {}",
                    polygon.len()
                )));
            }
        }

        let language = match input.language.as_deref() {
            Some(language) if !language.is_empty() => language,
            _ => self.language.as_str(),
        };

        let mut url = self.endpoint_url("autosuggest");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("input", &input.words);
            query.append_pair("language", language);
            if let Some(focus) = input.focus {
                query.append_pair("focus", &focus.to_string());
            }
            if let Some(clip) = input.clip.as_ref().filter(|clip| !clip.is_empty()) {
                query.append_pair(clip.param(), &clip.value());
            }
            query.append_pair("prefer-land", if input.prefers_land() { "true" } else { "false" });
        }
        Ok(self.request(url))
    }

    pub fn build_available_languages(&self) -> HttpRequest {
        self.request(self.endpoint_url("available-languages"))
    }

    pub fn build_convert_to_3wa(&self, coordinates: Coordinates) -> HttpRequest {
        let mut url = self.endpoint_url("convert-to-3wa");
        url.query_pairs_mut()
            .append_pair("coordinates", &coordinates.to_string())
            .append_pair("language", &self.language);
        self.request(url)
    }

    pub fn build_convert_to_coordinates(&self, words: &str) -> HttpRequest {
        let mut url = self.endpoint_url("convert-to-coordinates");
        url.query_pairs_mut()
            .append_pair("words", words)
            .append_pair("language", &self.language);
        self.request(url)
    }

    pub fn build_grid_section(&self, bounding_box: BoundingBox) -> HttpRequest {
        let mut url = self.endpoint_url("grid-section");
        url.query_pairs_mut()
            .append_pair("bounding-box", &bounding_box.to_string())
            .append_pair("language", &self.language);
        self.request(url)
    }

    pub fn parse_autosuggest(&self, response: HttpResponse) -> Result<AutoSuggestResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_available_languages(&self, response: HttpResponse) -> Result<Vec<Language>, ApiError> {
        parse_json::<AvailableLanguages>(response).map(|envelope| envelope.languages)
    }

    pub fn parse_location(&self, response: HttpResponse) -> Result<LocationResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_grid_section(&self, response: HttpResponse) -> Result<GridSection, ApiError> {
        parse_json(response)
    }

    /// `{endpoint}/{path}`, tolerating a trailing slash on the endpoint.
    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url
    }

    fn request(&self, url: Url) -> HttpRequest {
        HttpRequest {
            url,
            headers: vec![
                (CONTENT_TYPE_HEADER.to_string(), "application/json".to_string()),
                (API_KEY_HEADER.to_string(), self.api_key.clone()),
            ],
            timeout: None,
        }
    }

    fn send(&self, operation: Operation, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(%operation, url = %request.url, timeout = ?request.timeout, "sending request");
        let response = self.transport.send(request)?;
        debug!(%operation, status = response.status, "received response");
        Ok(response)
    }

    /// Send `request` with an optional deadline, parse the response and tag
    /// any failure with `operation`.
    fn execute<T>(
        &self,
        operation: Operation,
        request: Result<HttpRequest, ApiError>,
        timeout: Option<Duration>,
        parse: impl FnOnce(&Self, HttpResponse) -> Result<T, ApiError>,
    ) -> Result<T, Error> {
        let result = request.and_then(|mut request| {
            if timeout.is_some() {
                request.timeout = timeout;
            }
            let response = self.send(operation, &request)?;
            parse(self, response)
        });
        result.map_err(|e| Error::new(operation, e))
    }

    fn autosuggest_within(
        &self,
        input: &AutoSuggestInput,
        timeout: Option<Duration>,
    ) -> Result<AutoSuggestResponse, Error> {
        self.execute(
            Operation::AutoSuggest,
            self.build_autosuggest(input),
            timeout,
            Self::parse_autosuggest,
        )
    }

    fn available_languages_within(&self, timeout: Option<Duration>) -> Result<Vec<Language>, Error> {
        self.execute(
            Operation::AvailableLanguages,
            Ok(self.build_available_languages()),
            timeout,
            Self::parse_available_languages,
        )
    }

    fn convert_to_3wa_within(
        &self,
        coordinates: Coordinates,
        timeout: Option<Duration>,
    ) -> Result<LocationResponse, Error> {
        self.execute(
            Operation::ConvertTo3wa,
            Ok(self.build_convert_to_3wa(coordinates)),
            timeout,
            Self::parse_location,
        )
    }

    fn convert_to_coordinates_within(
        &self,
        words: &str,
        timeout: Option<Duration>,
    ) -> Result<LocationResponse, Error> {
        self.execute(
            Operation::ConvertToCoordinates,
            Ok(self.build_convert_to_coordinates(words)),
            timeout,
            Self::parse_location,
        )
    }

    fn grid_section_within(
        &self,
        bounding_box: BoundingBox,
        timeout: Option<Duration>,
    ) -> Result<GridSection, Error> {
        self.execute(
            Operation::GridSection,
            Ok(self.build_grid_section(bounding_box)),
            timeout,
            Self::parse_grid_section,
        )
    }
}

impl What3Words for What3WordsClient {
    fn autosuggest(&self, input: &AutoSuggestInput) -> Result<AutoSuggestResponse, Error> {
        self.autosuggest_within(input, None)
    }

    fn available_languages(&self) -> Result<Vec<Language>, Error> {
        self.available_languages_within(None)
    }

    fn convert_to_3wa(&self, coordinates: Coordinates) -> Result<LocationResponse, Error> {
        self.convert_to_3wa_within(coordinates, None)
    }

    fn convert_to_coordinates(&self, words: &str) -> Result<LocationResponse, Error> {
        self.convert_to_coordinates_within(words, None)
    }

    fn grid_section(&self, bounding_box: BoundingBox) -> Result<GridSection, Error> {
        self.grid_section_within(bounding_box, None)
    }
}

/// A borrowed `What3WordsClient` whose calls carry a deadline. Created by
/// `What3WordsClient::with_timeout`.
#[derive(Debug, Clone, Copy)]
pub struct TimedClient<'a> {
    client: &'a What3WordsClient,
    timeout: Duration,
}

impl TimedClient<'_> {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl What3Words for TimedClient<'_> {
    fn autosuggest(&self, input: &AutoSuggestInput) -> Result<AutoSuggestResponse, Error> {
        self.client.autosuggest_within(input, Some(self.timeout))
    }

    fn available_languages(&self) -> Result<Vec<Language>, Error> {
        self.client.available_languages_within(Some(self.timeout))
    }

    fn convert_to_3wa(&self, coordinates: Coordinates) -> Result<LocationResponse, Error> {
        self.client.convert_to_3wa_within(coordinates, Some(self.timeout))
    }

    fn convert_to_coordinates(&self, words: &str) -> Result<LocationResponse, Error> {
        self.client.convert_to_coordinates_within(words, Some(self.timeout))
    }

    fn grid_section(&self, bounding_box: BoundingBox) -> Result<GridSection, Error> {
        self.client.grid_section_within(bounding_box, Some(self.timeout))
    }
}

impl std::fmt::Debug for What3WordsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("What3WordsClient")
            .field("language", &self.language)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ServiceErrorDetail,
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_slice(&response.body).map_err(ApiError::Decode)
}

/// Map anything but 200 to `ApiError::Service`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    let reason = ureq::http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string();
    let detail = serde_json::from_slice::<ErrorEnvelope>(&response.body)
        .ok()
        .map(|envelope| envelope.error);
    warn!(
        url = %response.url,
        status = response.status,
        code = detail.as_ref().map(|d| d.code.as_str()),
        "unexpected status"
    );
    Err(ApiError::Service {
        url: response.url.clone(),
        status: response.status,
        reason,
        detail,
    })
}
