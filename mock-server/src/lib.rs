//! In-process stand-in for the what3words v3 API.
//!
//! Serves the five endpoints under `/v3` from a fixed dataset, checks the
//! `X-Api-Key` header, and reports failures with the service's error
//! envelope `{"error": {"code": ..., "message": ...}}`.

pub mod data;
pub mod geo;

use std::collections::HashMap;

use axum::{
    extract::{Query, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::debug;

use crate::data::Entry;
use crate::geo::{Bounds, Circle, Polygon};

/// The only key the mock accepts.
pub const API_KEY: &str = "mock-api-key";

/// Largest bounding-box diagonal `/grid-section` accepts.
pub const MAX_GRID_DIAGONAL_KM: f64 = 4.0;

/// Spacing of generated grid lines.
const GRID_LAT_STEP: f64 = 0.000027;
const GRID_LNG_STEP: f64 = 0.000043;

/// Suggestions returned per autosuggest call.
const MAX_SUGGESTIONS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub southwest: Coordinates,
    pub northeast: Coordinates,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub country: String,
    pub square: Square,
    pub nearest_place: String,
    pub coordinates: Coordinates,
    pub words: String,
    pub language: String,
    pub map: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridLine {
    pub start: Coordinates,
    pub end: Coordinates,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    pub lines: Vec<GridLine>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: String,
    pub name: String,
    pub native_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AvailableLanguages {
    pub languages: Vec<Language>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub country: String,
    pub nearest_place: String,
    pub words: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_to_focus_km: Option<u32>,
    pub rank: u32,
    pub language: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutoSuggest {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// A failed request, rendered as the service's error envelope.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiFailure {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    fn invalid_key() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "InvalidKey",
            message: "Authentication failed; invalid API key".to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        debug!(status = %self.status, code = self.code, "rejecting request");
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

type Params = Query<HashMap<String, String>>;

pub fn app() -> Router {
    let api = Router::new()
        .route("/autosuggest", get(autosuggest))
        .route("/available-languages", get(available_languages))
        .route("/convert-to-3wa", get(convert_to_3wa))
        .route("/convert-to-coordinates", get(convert_to_coordinates))
        .route("/grid-section", get(grid_section))
        .layer(middleware::from_fn(require_api_key));
    Router::new().nest("/v3", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());
    if key != Some(API_KEY) {
        return ApiFailure::invalid_key().into_response();
    }
    next.run(request).await
}

fn language_param(params: &HashMap<String, String>) -> Result<String, ApiFailure> {
    let language = params.get("language").map(String::as_str).unwrap_or("en");
    if !data::is_supported_language(language) {
        return Err(ApiFailure::bad_request(
            "BadLanguage",
            format!("language {language:?} is not supported"),
        ));
    }
    Ok(language.to_string())
}

fn location(entry: Entry) -> Location {
    Location {
        country: entry.country.to_string(),
        square: entry.square,
        nearest_place: entry.nearest_place.to_string(),
        coordinates: entry.coordinates,
        words: entry.words.to_string(),
        language: "en".to_string(),
        map: format!("https://w3w.co/{}", entry.words),
    }
}

/// Strip the `///` prefix and surrounding whitespace, lowercase the rest.
fn normalize_words(words: &str) -> String {
    words.trim().trim_start_matches("///").to_lowercase()
}

async fn available_languages() -> Json<AvailableLanguages> {
    Json(AvailableLanguages {
        languages: data::languages(),
    })
}

async fn convert_to_3wa(Query(params): Params) -> Result<Json<Location>, ApiFailure> {
    language_param(&params)?;
    let coordinates = params
        .get("coordinates")
        .and_then(|c| geo::parse_coordinates(c))
        .ok_or_else(|| {
            ApiFailure::bad_request("BadCoordinates", "coordinates must be lat,lng with lat in [-90, 90]")
        })?;

    let entries = data::entries();
    let containing = entries.iter().find(|e| e.contains(coordinates)).cloned();
    // Fall back to the closest known square.
    let entry = containing.or_else(|| {
        entries.into_iter().min_by(|a, b| {
            geo::haversine_km(a.coordinates, coordinates)
                .total_cmp(&geo::haversine_km(b.coordinates, coordinates))
        })
    });
    entry
        .map(|e| Json(location(e)))
        .ok_or_else(|| ApiFailure::bad_request("BadCoordinates", "no square found"))
}

async fn convert_to_coordinates(Query(params): Params) -> Result<Json<Location>, ApiFailure> {
    language_param(&params)?;
    let words = params.get("words").map(|w| normalize_words(w)).unwrap_or_default();
    if words.is_empty() {
        return Err(ApiFailure::bad_request("BadWords", "words must be specified"));
    }
    data::find_by_words(&words)
        .map(|e| Json(location(e)))
        .ok_or_else(|| ApiFailure::bad_request("BadWords", "Invalid or non-existent 3 word address"))
}

async fn grid_section(Query(params): Params) -> Result<Json<GridSection>, ApiFailure> {
    language_param(&params)?;
    let bounds = params
        .get("bounding-box")
        .and_then(|b| Bounds::parse(b))
        .ok_or_else(|| {
            ApiFailure::bad_request(
                "BadBoundingBox",
                "bounding-box must be south_lat,west_lng,north_lat,east_lng with south < north and west < east",
            )
        })?;
    if bounds.diagonal_km() > MAX_GRID_DIAGONAL_KM {
        return Err(ApiFailure::bad_request(
            "BadBoundingBoxTooBig",
            format!("bounding-box diagonal must not exceed {MAX_GRID_DIAGONAL_KM}km"),
        ));
    }
    Ok(Json(GridSection {
        lines: grid_lines(bounds),
    }))
}

/// Horizontal lines south to north, then vertical lines west to east.
pub fn grid_lines(bounds: Bounds) -> Vec<GridLine> {
    let mut lines = Vec::new();
    let first = (bounds.south / GRID_LAT_STEP).ceil() as i64;
    let last = (bounds.north / GRID_LAT_STEP).floor() as i64;
    for i in first..=last {
        let lat = i as f64 * GRID_LAT_STEP;
        lines.push(GridLine {
            start: Coordinates { lat, lng: bounds.west },
            end: Coordinates { lat, lng: bounds.east },
        });
    }
    let first = (bounds.west / GRID_LNG_STEP).ceil() as i64;
    let last = (bounds.east / GRID_LNG_STEP).floor() as i64;
    for i in first..=last {
        let lng = i as f64 * GRID_LNG_STEP;
        lines.push(GridLine {
            start: Coordinates { lat: bounds.south, lng },
            end: Coordinates { lat: bounds.north, lng },
        });
    }
    lines
}

enum Clip {
    BoundingBox(Bounds),
    Circle(Circle),
    Polygon(Polygon),
    Country(Vec<String>),
}

impl Clip {
    fn allows(&self, entry: &Entry) -> bool {
        match self {
            Clip::BoundingBox(b) => b.contains(entry.coordinates),
            Clip::Circle(c) => c.contains(entry.coordinates),
            Clip::Polygon(p) => p.contains(entry.coordinates),
            Clip::Country(codes) => codes.iter().any(|c| c == entry.country),
        }
    }
}

fn clip_params(params: &HashMap<String, String>) -> Result<Vec<Clip>, ApiFailure> {
    let mut clips = Vec::new();
    if let Some(b) = params.get("clip-to-bounding-box") {
        let b = Bounds::parse(b).ok_or_else(|| {
            ApiFailure::bad_request("BadClipToBoundingBox", "invalid clip-to-bounding-box")
        })?;
        clips.push(Clip::BoundingBox(b));
    }
    if let Some(c) = params.get("clip-to-circle") {
        let c = Circle::parse(c)
            .ok_or_else(|| ApiFailure::bad_request("BadClipToCircle", "invalid clip-to-circle"))?;
        clips.push(Clip::Circle(c));
    }
    if let Some(p) = params.get("clip-to-polygon") {
        let p = Polygon::parse(p).ok_or_else(|| {
            ApiFailure::bad_request(
                "BadClipToPolygon",
                format!(
                    "clip-to-polygon must be a closed list of 4 to {} lat,lng pairs",
                    geo::MAX_POLYGON_POINTS
                ),
            )
        })?;
        clips.push(Clip::Polygon(p));
    }
    if let Some(codes) = params.get("clip-to-country") {
        let codes: Vec<String> = codes.split(',').map(|c| c.trim().to_string()).collect();
        let valid = codes
            .iter()
            .all(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_uppercase()));
        if !valid {
            return Err(ApiFailure::bad_request(
                "BadClipToCountry",
                "clip-to-country must be uppercase ISO 3166-1 alpha-2 codes",
            ));
        }
        clips.push(Clip::Country(codes));
    }
    Ok(clips)
}

async fn autosuggest(Query(params): Params) -> Result<Json<AutoSuggest>, ApiFailure> {
    let input = params.get("input").map(|w| normalize_words(w)).unwrap_or_default();
    if input.is_empty() {
        return Err(ApiFailure::bad_request("BadInput", "input must be specified"));
    }
    let language = language_param(&params)?;
    let focus = match params.get("focus") {
        Some(f) => Some(geo::parse_coordinates(f).ok_or_else(|| {
            ApiFailure::bad_request("BadFocus", "focus must be lat,lng")
        })?),
        None => None,
    };
    match params.get("prefer-land").map(String::as_str) {
        None | Some("true") | Some("false") => {}
        Some(_) => {
            return Err(ApiFailure::bad_request(
                "BadPreferLand",
                "prefer-land must be true or false",
            ))
        }
    }
    let clips = clip_params(&params)?;

    let mut matches: Vec<(Entry, Option<f64>)> = data::entries()
        .into_iter()
        .filter(|e| e.words.starts_with(&input))
        .filter(|e| clips.iter().all(|c| c.allows(e)))
        .map(|e| {
            let distance = focus.map(|f| geo::haversine_km(f, e.coordinates));
            (e, distance)
        })
        .collect();
    if focus.is_some() {
        matches.sort_by(|a, b| a.1.unwrap_or(0.0).total_cmp(&b.1.unwrap_or(0.0)));
    }

    let suggestions = matches
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .enumerate()
        .map(|(i, (e, distance))| Suggestion {
            country: e.country.to_string(),
            nearest_place: e.nearest_place.to_string(),
            words: e.words.to_string(),
            distance_to_focus_km: distance.map(|d| d.round() as u32),
            rank: i as u32 + 1,
            language: language.clone(),
        })
        .collect();
    Ok(Json(AutoSuggest { suggestions }))
}
