//! Places autocomplete predictor against a mock server.

use weather_widget_core::{GooglePlacesPredictor, PlacePredictor};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTOCOMPLETE: &str = "/maps/api/place/autocomplete/json";

fn prediction(description: &str, main: &str, secondary: &str, matched: usize) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "place_id": format!("id-{main}"),
        "structured_formatting": {
            "main_text": main,
            "main_text_matched_substrings": [{ "offset": 0, "length": matched }],
            "secondary_text": secondary
        },
        "terms": description
            .split(", ")
            .map(|t| serde_json::json!({ "offset": 0, "value": t }))
            .collect::<Vec<_>>(),
        "types": ["locality", "political", "geocode"]
    })
}

#[tokio::test]
async fn predictions_keep_provider_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTOCOMPLETE))
        .and(query_param("input", "Par"))
        .and(query_param("key", "PLACES"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "predictions": [
                prediction("Paris, France", "Paris", "France", 3),
                prediction("Paris, TX, USA", "Paris", "TX, USA", 3),
                prediction("Parma, Province of Parma, Italy", "Parma", "Province of Parma, Italy", 3),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let predictor = GooglePlacesPredictor::with_base_url("PLACES".into(), &server.uri());
    let results = predictor.predict("Par").await;

    let descriptions: Vec<_> = results.iter().map(|p| p.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec!["Paris, France", "Paris, TX, USA", "Parma, Province of Parma, Italy"]
    );
    assert_eq!(results[1].structured_formatting.secondary_text, "TX, USA");
    assert_eq!(results[1].terms.len(), 3);
    assert_eq!(results[0].place_id.as_deref(), Some("id-Paris"));

    let parts = results[2].highlighted_parts();
    assert_eq!(parts[0].text, "Par");
    assert!(parts[0].highlight);
    assert_eq!(parts[1].text, "ma");
}

#[tokio::test]
async fn zero_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTOCOMPLETE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ZERO_RESULTS",
            "predictions": []
        })))
        .mount(&server)
        .await;

    let predictor = GooglePlacesPredictor::with_base_url("PLACES".into(), &server.uri());
    assert!(predictor.predict("zzzzqx").await.is_empty());
}

#[tokio::test]
async fn denied_request_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTOCOMPLETE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "predictions": []
        })))
        .mount(&server)
        .await;

    let predictor = GooglePlacesPredictor::with_base_url("BAD".into(), &server.uri());
    assert!(predictor.predict("Par").await.is_empty());
}

#[tokio::test]
async fn server_error_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTOCOMPLETE))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let predictor = GooglePlacesPredictor::with_base_url("PLACES".into(), &server.uri());
    assert!(predictor.predict("Par").await.is_empty());
}

#[tokio::test]
async fn garbage_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(AUTOCOMPLETE))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let predictor = GooglePlacesPredictor::with_base_url("PLACES".into(), &server.uri());
    assert!(predictor.predict("Par").await.is_empty());
}
