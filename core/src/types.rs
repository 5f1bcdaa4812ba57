//! Value types for the what3words API.
//!
//! # Design
//! Request-side types (`Coordinates`, `BoundingBox`, `CoordinateRadius`,
//! `PolygonCoordinates`) render themselves through `Display` into the exact
//! comma-separated form the service expects in query strings. Response-side
//! types mirror the service's camelCase JSON and tolerate omitted fields,
//! since the service drops empty values depending on its serialization mode.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of polygon points accepted by autosuggest, including the
/// closing point that repeats the first.
pub const MAX_POLYGON_POINTS: usize = 25;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// A rectangular area given by its southern and northern latitudes and its
/// western and eastern longitudes.
///
/// `south_lat < north_lat` and `west_lng < east_lng` are expected but not
/// checked; the service rejects inverted boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub south_lat: f64,
    pub west_lng: f64,
    pub north_lat: f64,
    pub east_lng: f64,
}

impl BoundingBox {
    pub fn new(south_lat: f64, west_lng: f64, north_lat: f64, east_lng: f64) -> Self {
        Self {
            south_lat,
            west_lng,
            north_lat,
            east_lng,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.south_lat, self.west_lng, self.north_lat, self.east_lng
        )
    }
}

/// A circle around `coordinates` with a radius in kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRadius {
    pub coordinates: Coordinates,
    pub radius_km: u32,
}

impl CoordinateRadius {
    pub fn new(coordinates: Coordinates, radius_km: u32) -> Self {
        Self {
            coordinates,
            radius_km,
        }
    }
}

impl fmt::Display for CoordinateRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.coordinates, self.radius_km)
    }
}

/// An ordered list of points describing a closed polygon: the first point is
/// repeated as the last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonCoordinates(pub Vec<Coordinates>);

impl PolygonCoordinates {
    /// Build a polygon from `points`, appending the first point when the list
    /// is not already closed.
    pub fn closed(points: Vec<Coordinates>) -> Self {
        let mut points = points;
        if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
            if first != *last {
                points.push(first);
            }
        }
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Coordinates] {
        &self.0
    }
}

impl fmt::Display for PolygonCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{point}")?;
        }
        Ok(())
    }
}

/// The 3m x 3m grid square a three-word address refers to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub southwest: Coordinates,
    pub northeast: Coordinates,
}

/// Result of converting between coordinates and a three-word address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub coordinates: Coordinates,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub map: String,
    #[serde(default)]
    pub nearest_place: String,
    pub square: Square,
    #[serde(default)]
    pub words: String,
}

/// A single grid line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub start: Coordinates,
    pub end: Coordinates,
}

/// The grid lines covering a bounding box, in the order the service returned
/// them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lines: Vec<GridLine>,
}

/// A supported address language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// ISO 639-1 two-letter code.
    pub code: String,
    pub name: String,
    pub native_name: String,
}

/// Envelope returned by `/available-languages`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailableLanguages {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub languages: Vec<Language>,
}

/// A single autosuggest result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub nearest_place: String,
    pub words: String,
    /// Only present when the request carried a focus point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_to_focus_km: Option<u32>,
    /// 1-based position in the result list.
    pub rank: u32,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoSuggestResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggestions: Vec<Suggestion>,
}

/// Decode a missing or `null` array as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Geographic restriction applied to autosuggest results.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipFilter {
    BoundingBox(BoundingBox),
    Circle(CoordinateRadius),
    Polygon(PolygonCoordinates),
    /// ISO 3166-1 alpha-2 country codes. Sent uppercased.
    Country(Vec<String>),
}

impl ClipFilter {
    /// Query parameter name this filter is sent under.
    pub fn param(&self) -> &'static str {
        match self {
            ClipFilter::BoundingBox(_) => "clip-to-bounding-box",
            ClipFilter::Circle(_) => "clip-to-circle",
            ClipFilter::Polygon(_) => "clip-to-polygon",
            ClipFilter::Country(_) => "clip-to-country",
        }
    }

    /// A polygon without points or a country list without codes restricts
    /// nothing and is not sent.
    pub fn is_empty(&self) -> bool {
        match self {
            ClipFilter::BoundingBox(_) | ClipFilter::Circle(_) => false,
            ClipFilter::Polygon(p) => p.is_empty(),
            ClipFilter::Country(codes) => codes.iter().all(|c| c.trim().is_empty()),
        }
    }

    /// Query parameter value for this filter.
    pub fn value(&self) -> String {
        match self {
            ClipFilter::BoundingBox(b) => b.to_string(),
            ClipFilter::Circle(c) => c.to_string(),
            ClipFilter::Polygon(p) => p.to_string(),
            ClipFilter::Country(codes) => codes
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| c.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Parameters for an autosuggest request.
///
/// Only one clipping filter is kept: each `clip_to_*` call replaces the
/// previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSuggestInput {
    pub words: String,
    pub clip: Option<ClipFilter>,
    pub focus: Option<Coordinates>,
    pub language: Option<String>,
    pub prefer_land: Option<bool>,
}

impl AutoSuggestInput {
    pub fn new(words: impl Into<String>) -> Self {
        Self {
            words: words.into(),
            clip: None,
            focus: None,
            language: None,
            prefer_land: None,
        }
    }

    pub fn focus(mut self, focus: Coordinates) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn prefer_land(mut self, prefer_land: bool) -> Self {
        self.prefer_land = Some(prefer_land);
        self
    }

    pub fn clip_to_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.clip = Some(ClipFilter::BoundingBox(bounding_box));
        self
    }

    pub fn clip_to_circle(mut self, circle: CoordinateRadius) -> Self {
        self.clip = Some(ClipFilter::Circle(circle));
        self
    }

    pub fn clip_to_polygon(mut self, polygon: PolygonCoordinates) -> Self {
        self.clip = Some(ClipFilter::Polygon(polygon));
        self
    }

    pub fn clip_to_country<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clip = Some(ClipFilter::Country(
            countries.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Effective `prefer-land` value; the service default is `true`.
    pub fn prefers_land(&self) -> bool {
        self.prefer_land.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_render_with_six_decimals() {
        let c = Coordinates::new(51.521251, 0.203586);
        assert_eq!(c.to_string(), "51.521251,0.203586");
        assert_eq!(Coordinates::new(1.0, -2.5).to_string(), "1.000000,-2.500000");
    }

    #[test]
    fn bounding_box_renders_south_west_north_east() {
        let b = BoundingBox::new(52.207988, 0.116126, 52.208867, 0.11754);
        assert_eq!(b.to_string(), "52.207988,0.116126,52.208867,0.117540");
    }

    #[test]
    fn coordinate_radius_appends_radius() {
        let r = CoordinateRadius::new(Coordinates::new(51.5, -0.1), 10);
        assert_eq!(r.to_string(), "51.500000,-0.100000,10");
    }

    #[test]
    fn polygon_renders_comma_joined_points() {
        let p = PolygonCoordinates(vec![
            Coordinates::new(1.0, 2.0),
            Coordinates::new(3.0, 4.0),
        ]);
        assert_eq!(p.to_string(), "1.000000,2.000000,3.000000,4.000000");
        assert_eq!(PolygonCoordinates::default().to_string(), "");
    }

    #[test]
    fn closed_polygon_repeats_first_point_once() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        let c = Coordinates::new(1.0, 1.0);

        let open = PolygonCoordinates::closed(vec![a, b, c]);
        assert_eq!(open.points(), &[a, b, c, a]);

        let already = PolygonCoordinates::closed(vec![a, b, c, a]);
        assert_eq!(already.len(), 4);

        assert!(PolygonCoordinates::closed(Vec::new()).is_empty());
    }

    #[test]
    fn country_filter_is_uppercased_and_joined() {
        let filter = ClipFilter::Country(vec!["gb".to_string(), "Fr".to_string()]);
        assert_eq!(filter.param(), "clip-to-country");
        assert_eq!(filter.value(), "GB,FR");
    }

    #[test]
    fn later_clip_filter_replaces_earlier_one() {
        let input = AutoSuggestInput::new("index.home.r")
            .clip_to_bounding_box(BoundingBox::new(51.0, -1.0, 52.0, 1.0))
            .clip_to_country(["GB"]);
        assert_eq!(input.clip, Some(ClipFilter::Country(vec!["GB".to_string()])));
    }

    #[test]
    fn prefer_land_defaults_to_true() {
        assert!(AutoSuggestInput::new("a.b.c").prefers_land());
        assert!(!AutoSuggestInput::new("a.b.c").prefer_land(false).prefers_land());
    }

    #[test]
    fn location_response_decodes_camel_case() {
        let json = r#"{
            "country": "GB",
            "square": {
                "southwest": {"lng": -0.195543, "lat": 51.520833},
                "northeast": {"lng": -0.195499, "lat": 51.52086}
            },
            "nearestPlace": "Bayswater, London",
            "coordinates": {"lng": -0.195521, "lat": 51.520847},
            "words": "filled.count.soap",
            "language": "en",
            "map": "https://w3w.co/filled.count.soap"
        }"#;
        let loc: LocationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(loc.nearest_place, "Bayswater, London");
        assert_eq!(loc.square.northeast, Coordinates::new(51.52086, -0.195499));
    }

    #[test]
    fn suggestion_without_focus_has_no_distance() {
        let json = r#"{"country":"GB","nearestPlace":"Bayswater, London","words":"index.home.raft","rank":1,"language":"en"}"#;
        let s: Suggestion = serde_json::from_str(json).unwrap();
        assert_eq!(s.distance_to_focus_km, None);
        assert_eq!(s.rank, 1);
    }

    #[test]
    fn missing_suggestions_decode_to_empty() {
        let resp: AutoSuggestResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.suggestions.is_empty());
        let resp: AutoSuggestResponse = serde_json::from_str(r#"{"suggestions":[]}"#).unwrap();
        assert!(resp.suggestions.is_empty());
    }

    #[test]
    fn null_arrays_decode_to_empty() {
        let resp: AutoSuggestResponse = serde_json::from_str(r#"{"suggestions":null}"#).unwrap();
        assert!(resp.suggestions.is_empty());

        let grid: GridSection = serde_json::from_str(r#"{"lines":null}"#).unwrap();
        assert!(grid.lines.is_empty());

        let langs: AvailableLanguages = serde_json::from_str(r#"{"languages":null}"#).unwrap();
        assert!(langs.languages.is_empty());
    }

    #[test]
    fn empty_polygon_and_country_filters_are_empty() {
        assert!(ClipFilter::Polygon(PolygonCoordinates::default()).is_empty());
        assert!(ClipFilter::Country(Vec::new()).is_empty());
        assert!(ClipFilter::Country(vec![" ".to_string()]).is_empty());
        assert!(!ClipFilter::Country(vec!["gb".to_string(), "".to_string()]).is_empty());
        assert_eq!(ClipFilter::Country(vec!["gb".to_string(), "".to_string()]).value(), "GB");
        assert!(!ClipFilter::BoundingBox(BoundingBox::new(51.0, -1.0, 52.0, 1.0)).is_empty());
    }
}
