use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

fn setup_test_app() -> (axum::Router, Arc<common::StubGeometry>) {
    let (geocoder, geometry) = common::sample_services();
    let geometry = Arc::new(geometry);
    let state = common::create_test_state(geocoder, geometry.clone());
    (floodmap::routes::create_router(state), geometry)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/debug/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["cache"]["backend"], "memory");
}

#[tokio::test]
async fn test_search_returns_candidates() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/search?q=EDSA").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["empty"], false);
    assert_eq!(json["candidates"][0]["name"], "EDSA");
    assert_eq!(json["candidates"][0]["position"]["lat"], 14.5866);
}

#[tokio::test]
async fn test_search_empty_result() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/search?q=Nonexistent%20Road").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
    assert_eq!(json["empty"], true);
    assert!(json["candidates"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_validation() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "q must not be empty");

    let (status, _) = get_json(&app, "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_upstream_failure_is_bad_gateway() {
    let geocoder = common::StubGeocoder {
        fail: true,
        ..Default::default()
    };
    let state = common::create_test_state(geocoder, Arc::new(common::StubGeometry::default()));
    let app = floodmap::routes::create_router(state);

    let (status, json) = get_json(&app, "/search?q=EDSA").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["message"], "Place search service error");
}

#[tokio::test]
async fn test_recent_searches() {
    let (app, _) = setup_test_app();

    get_json(&app, "/search?q=EDSA").await;
    get_json(&app, "/search?q=Katipunan").await;
    get_json(&app, "/search?q=EDSA").await;

    let (status, json) = get_json(&app, "/search/recent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["searches"], serde_json::json!(["EDSA", "Katipunan"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recent_searches_written_to_preference_file() {
    let dir = std::env::temp_dir().join(format!(
        "floodmap-api-recent-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("prefs.json");
    let store = Arc::new(floodmap::preferences::JsonFileStore::open(&path).unwrap());

    let (geocoder, geometry) = common::sample_services();
    let state = common::create_test_state_with_store(geocoder, Arc::new(geometry), store);
    let app = floodmap::routes::create_router(state);

    let (status, _) = get_json(&app, "/search?q=Katipunan").await;
    assert_eq!(status, StatusCode::OK);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["recentSearches"], r#"["Katipunan"]"#);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_road_overlay_geojson() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/roads?name=EDSA&score=0.75").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["severity"], "severe");
    assert_eq!(json["color"], "red");
    assert_eq!(json["way_count"], 2);
    assert_eq!(json["zoom"], 16);
    assert_eq!(json["overlay"]["type"], "FeatureCollection");

    let features = json["overlay"]["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["way_id"], 100);
    assert_eq!(features[1]["properties"]["way_id"], 101);
    for feature in features {
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["properties"]["color"], "red");
    }

    // Center defaults to the first point of the first way
    assert_eq!(json["center"]["lat"], 14.58);
    assert_eq!(json["center"]["lon"], 121.05);
}

#[tokio::test]
async fn test_road_overlay_uses_requested_position() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(
        &app,
        "/roads?name=Katipunan%20Avenue&score=0&lat=14.6395&lon=121.0742",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["severity"], "none");
    assert_eq!(json["color"], "green");
    assert_eq!(json["center"]["lat"], 14.6395);
    assert_eq!(
        json["overlay"]["features"][0]["properties"]["name"],
        "Katipunan Avenue"
    );
}

#[tokio::test]
async fn test_road_overlay_unknown_road_is_empty() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/roads?name=Nowhere%20Street&score=0.5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["way_count"], 0);
    assert!(json["overlay"]["features"].as_array().unwrap().is_empty());
    assert!(json["zoom"].is_null());
}

#[tokio::test]
async fn test_road_overlay_validation() {
    let (app, _) = setup_test_app();

    let (status, _) = get_json(&app, "/roads?score=0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(&app, "/roads?name=EDSA&lat=14.6").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "lat and lon must be given together");

    let (status, _) = get_json(&app, "/roads?name=EDSA&lat=95&lon=121").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app, "/roads?name=EDSA&score=NaN").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_road_overlay_is_cached() {
    let (app, geometry) = setup_test_app();

    get_json(&app, "/roads?name=EDSA&score=0.5").await;
    get_json(&app, "/roads?name=EDSA&score=0.9").await;

    assert_eq!(geometry.call_count(), 1);
}

#[tokio::test]
async fn test_legend_and_map_config() {
    let (app, _) = setup_test_app();

    let (status, json) = get_json(&app, "/legend").await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Severe", "Moderate", "Light", "No Flood"]);

    let (status, json) = get_json(&app, "/map/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["zoom"], 6);
    assert_eq!(json["center"]["lat"], 12.87);
    assert_eq!(json["tiles"]["max_zoom"], 19);
    assert_eq!(
        json["tiles"]["url_template"],
        "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
    );
    assert_eq!(json["fallback_position"]["lon"], 121.07);
}
