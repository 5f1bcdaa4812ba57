use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use w3w_mock_server::{
    app, AutoSuggest, AvailableLanguages, ErrorBody, GridSection, Location, API_KEY,
};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header("X-Api-Key", API_KEY)
        .body(String::new())
        .unwrap()
}

async fn error_code(response: axum::response::Response) -> String {
    let body: ErrorBody = body_json(response).await;
    body.error.code
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v3/available-languages")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(resp).await, "InvalidKey");
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v3/available-languages")
                .header("X-Api-Key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let resp = app().oneshot(get("/v3/nowhere")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- available-languages ---

#[tokio::test]
async fn available_languages_lists_in_fixed_order() {
    let resp = app().oneshot(get("/v3/available-languages")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AvailableLanguages = body_json(resp).await;
    let codes: Vec<&str> = body.languages.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, ["de", "en", "es", "fr", "ja"]);
    assert_eq!(body.languages[0].native_name, "Deutsch");
}

// --- convert-to-coordinates ---

#[tokio::test]
async fn convert_to_coordinates_known_words() {
    let resp = app()
        .oneshot(get("/v3/convert-to-coordinates?words=filled.count.soap&language=en"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let loc: Location = body_json(resp).await;
    assert_eq!(loc.country, "GB");
    assert_eq!(loc.coordinates.lat, 51.520847);
    assert_eq!(loc.square.southwest.lng, -0.195543);
    assert_eq!(loc.map, "https://w3w.co/filled.count.soap");
}

#[tokio::test]
async fn convert_to_coordinates_accepts_slash_prefix() {
    let resp = app()
        .oneshot(get("/v3/convert-to-coordinates?words=%2F%2F%2Findex.home.raft"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let loc: Location = body_json(resp).await;
    assert_eq!(loc.words, "index.home.raft");
}

#[tokio::test]
async fn convert_to_coordinates_empty_words_returns_400() {
    let resp = app()
        .oneshot(get("/v3/convert-to-coordinates?words=&language=en"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadWords");
}

#[tokio::test]
async fn convert_to_coordinates_unknown_words_returns_400() {
    let resp = app()
        .oneshot(get("/v3/convert-to-coordinates?words=no.such.place"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadWords");
}

#[tokio::test]
async fn unsupported_language_returns_400() {
    let resp = app()
        .oneshot(get("/v3/convert-to-coordinates?words=filled.count.soap&language=tlh"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadLanguage");
}

// --- convert-to-3wa ---

#[tokio::test]
async fn convert_to_3wa_inside_known_square() {
    let resp = app()
        .oneshot(get("/v3/convert-to-3wa?coordinates=51.521251%2C-0.203586&language=en"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let loc: Location = body_json(resp).await;
    assert_eq!(loc.words, "index.home.raft");
    assert_eq!(loc.nearest_place, "Bayswater, London");
}

#[tokio::test]
async fn convert_to_3wa_falls_back_to_nearest_square() {
    let resp = app()
        .oneshot(get("/v3/convert-to-3wa?coordinates=52.5,13.4"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let loc: Location = body_json(resp).await;
    assert_eq!(loc.words, "limit.broom.flip");
}

#[tokio::test]
async fn convert_to_3wa_bad_coordinates_returns_400() {
    let resp = app()
        .oneshot(get("/v3/convert-to-3wa?coordinates=95,0"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadCoordinates");
}

// --- grid-section ---

#[tokio::test]
async fn grid_section_returns_lines() {
    let resp = app()
        .oneshot(get(
            "/v3/grid-section?bounding-box=52.207988,0.116126,52.208867,0.11754",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let grid: GridSection = body_json(resp).await;
    assert!(!grid.lines.is_empty());
    assert_eq!(grid.lines[0].start.lng, 0.116126);
    assert_eq!(grid.lines[0].end.lng, 0.11754);
}

#[tokio::test]
async fn grid_section_inverted_box_returns_400() {
    let resp = app()
        .oneshot(get("/v3/grid-section?bounding-box=52.208867,0.116126,52.207988,0.11754"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadBoundingBox");
}

#[tokio::test]
async fn grid_section_too_big_returns_400() {
    let resp = app()
        .oneshot(get("/v3/grid-section?bounding-box=51,-1,52,1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadBoundingBoxTooBig");
}

// --- autosuggest ---

#[tokio::test]
async fn autosuggest_without_input_returns_400() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=&language=en&prefer-land=true"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadInput");
}

#[tokio::test]
async fn autosuggest_ranks_in_dataset_order_without_focus() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=index.home.ra"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AutoSuggest = body_json(resp).await;
    let words: Vec<&str> = body.suggestions.iter().map(|s| s.words.as_str()).collect();
    assert_eq!(words, ["index.home.raft", "index.home.rafts", "index.home.raged"]);
    assert!(body.suggestions.iter().all(|s| s.distance_to_focus_km.is_none()));
    assert_eq!(body.suggestions[2].rank, 3);
}

#[tokio::test]
async fn autosuggest_focus_orders_by_distance() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=index.home.ra&focus=51.52,-0.19"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AutoSuggest = body_json(resp).await;
    let words: Vec<&str> = body.suggestions.iter().map(|s| s.words.as_str()).collect();
    assert_eq!(words, ["index.home.raft", "index.home.ramps", "index.home.raged"]);
    assert_eq!(body.suggestions[0].distance_to_focus_km, Some(1));
    assert_eq!(body.suggestions[0].rank, 1);
}

#[tokio::test]
async fn autosuggest_clip_to_country() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=index.home.ra&clip-to-country=US,FR"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AutoSuggest = body_json(resp).await;
    let words: Vec<&str> = body.suggestions.iter().map(|s| s.words.as_str()).collect();
    assert_eq!(words, ["index.home.rafts", "index.home.raged"]);
}

#[tokio::test]
async fn autosuggest_clip_to_polygon() {
    // A box around west London.
    let resp = app()
        .oneshot(get(
            "/v3/autosuggest?input=index.home.ra&clip-to-polygon=51.4,-0.3,51.6,-0.3,51.6,0.0,51.4,0.0,51.4,-0.3",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AutoSuggest = body_json(resp).await;
    let words: Vec<&str> = body.suggestions.iter().map(|s| s.words.as_str()).collect();
    assert_eq!(words, ["index.home.raft", "index.home.ramps"]);
}

#[tokio::test]
async fn autosuggest_unmatched_input_returns_empty_list() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=zzz.zzz.zz"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: AutoSuggest = body_json(resp).await;
    assert!(body.suggestions.is_empty());
}

#[tokio::test]
async fn autosuggest_bad_prefer_land_returns_400() {
    let resp = app()
        .oneshot(get("/v3/autosuggest?input=index.home.ra&prefer-land=maybe"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadPreferLand");
}

#[tokio::test]
async fn autosuggest_open_polygon_returns_400() {
    let resp = app()
        .oneshot(get(
            "/v3/autosuggest?input=index.home.ra&clip-to-polygon=51.4,-0.3,51.6,-0.3,51.6,0.0,51.4,0.0",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(resp).await, "BadClipToPolygon");
}
