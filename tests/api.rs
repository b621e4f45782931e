//! HTTP surface tests
//!
//! Drives the router end-to-end with in-process geocoding, timezone and
//! engine backends.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use vedic_api::engine::{ChartEngine, EngineRequest};
use vedic_api::location::{Coordinates, Geocoder, LocationError, LocationResolver, TimezoneLookup};
use vedic_api::services::ChartService;
use vedic_api::{router, AppState, ServiceConfig};

#[derive(Clone, Copy)]
enum GeoBehaviour {
    Found,
    Missing,
    Timeout,
    Broken,
}

struct MockGeocoder {
    behaviour: GeoBehaviour,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, _place: &str) -> Result<Option<Coordinates>, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            GeoBehaviour::Found => Ok(Some(Coordinates { latitude: 12.4, longitude: 78.0 })),
            GeoBehaviour::Missing => Ok(None),
            GeoBehaviour::Timeout => Err(LocationError::Timeout),
            GeoBehaviour::Broken => Err(LocationError::Service("upstream 500".into())),
        }
    }
}

struct MockZones(Option<&'static str>);

#[async_trait]
impl TimezoneLookup for MockZones {
    async fn timezone_at(&self, _lat: f64, _lon: f64) -> Result<Option<String>, LocationError> {
        Ok(self.0.map(str::to_string))
    }
}

struct MockEngine {
    last: Arc<Mutex<Option<EngineRequest>>>,
}

#[async_trait]
impl ChartEngine for MockEngine {
    async fn calculate(&self, request: &EngineRequest) -> Result<Value> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(engine_output())
    }
}

fn engine_output() -> Value {
    json!({
        "d1_chart": {
            "houses": [
                {"number": 1, "sign": {"name": "Scorpio"}, "occupants": [
                    {"celestial_body": {"name": "Mars"}, "sign": {"name": "Scorpio"}}
                ]},
                {"number": 2, "sign": {"name": "Sagittarius"}, "occupants": []}
            ],
            "planets": [
                {"celestial_body": "Sun", "sign": "Aries", "house": 6, "motion_type": "direct",
                 "aspects": [{"type": "7th", "target": "Saturn"}]},
                {"celestial_body": "Moon", "sign": "Taurus", "house": 7, "motion_type": "direct"},
                {"celestial_body": "Mars", "sign": "Scorpio", "house": 1, "motion_type": "Retrograde"},
                {"celestial_body": "Jupiter", "sign": "Pisces", "house": 5}
            ]
        },
        "divisional_charts": {
            "d9": {"houses": [{"number": 1, "sign": "Leo", "occupants": [{"celestial_body": "Sun", "sign": "Leo"}]}]},
            "d10": {"houses": [{"number": 1, "sign": "Virgo", "occupants": []}]}
        },
        "panchanga": {"tithi": "Shukla Dashami", "nakshatra": "Rohini", "yoga": "Siddhi", "karana": "Garaja", "vaara": "Wednesday"},
        "vimshottari_dasha": {"mahadashas": [{"planet": "Moon", "start": "1999-05-05", "end": "2005-01-01"}]}
    })
}

struct Harness {
    app: axum::Router,
    geocode_calls: Arc<AtomicUsize>,
    engine_request: Arc<Mutex<Option<EngineRequest>>>,
}

fn harness(geo: GeoBehaviour, zone: Option<&'static str>) -> Harness {
    let geocode_calls = Arc::new(AtomicUsize::new(0));
    let engine_request = Arc::new(Mutex::new(None));

    let resolver = LocationResolver::new(
        Arc::new(MockGeocoder { behaviour: geo, calls: geocode_calls.clone() }),
        Arc::new(MockZones(zone)),
    );
    let engine = Arc::new(MockEngine { last: engine_request.clone() });
    let charts = ChartService::new(resolver, engine, "User");

    let state = AppState {
        config: Arc::new(ServiceConfig::default()),
        charts: Arc::new(charts),
    };

    Harness {
        app: router(state),
        geocode_calls,
        engine_request,
    }
}

fn birth(date: &str, time: &str) -> Value {
    json!({"name": "Asha", "date": date, "time": time, "place": "Karimangalam, India"})
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_lists_endpoints() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Vedic Astrology API");
    assert!(body["endpoints"]["birth_chart"].is_string());
    assert!(body["endpoints"]["dashas"].is_string());
}

#[tokio::test]
async fn test_birth_chart_summary() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let (status, body) = post(&h.app, "/birth_chart", birth("5th May 1999", "02:35PM")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["birth_data"];
    assert_eq!(data["name"], "Asha");
    assert_eq!(data["date"], "1999-05-05");
    assert_eq!(data["time"], "14:35");
    assert_eq!(data["datetime"], "1999-05-05T14:35:00");
    assert_eq!(data["tz_offset"], json!(5.5));
    assert_eq!(data["latitude"], json!(12.4));
    assert_eq!(data["ascendant_sign"], "Scorpio");
    assert_eq!(data["moon_sign"], "Taurus");

    assert_eq!(body["panchanga"]["nakshatra"], "Rohini");
    assert_eq!(body["d1_chart"]["houses"][0]["house_number"], json!(1));
    assert_eq!(
        body["d1_chart"]["houses"][0]["occupants"][0],
        json!({"planet": "Mars", "sign": "Scorpio"})
    );
    assert!(body.get("raw_chart").is_none());
    assert!(body.get("charts").is_none());

    let sent = h.engine_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.birth_date, "1999-05-05T14:35:00");
    assert_eq!(sent.timezone_offset, 5.5);
    assert_eq!(sent.name, "Asha");
}

#[tokio::test]
async fn test_detailed_adds_raw_and_divisional_charts() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let (_, plain) = post(&h.app, "/birth_chart?detailed=false", birth("1999-05-05", "14:35")).await;
    let (status, detailed) = post(&h.app, "/birth_chart?detailed=true", birth("1999-05-05", "14:35")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detailed["raw_chart"], engine_output());
    assert_eq!(detailed["charts"]["d9"]["houses"][0]["sign"], "Leo");
    assert_eq!(detailed["charts"]["d10"]["houses"][0]["sign"], "Virgo");

    for key in ["birth_data", "panchanga", "d1_chart"] {
        assert_eq!(plain[key], detailed[key], "{} differs", key);
    }
    assert!(plain.get("raw_chart").is_none());
}

#[tokio::test]
async fn test_detailed_accepts_common_spellings() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    for uri in ["/birth_chart?detailed=1", "/birth_chart?detailed=yes", "/birth_chart?detailed=True"] {
        let (status, body) = post(&h.app, uri, birth("1999-05-05", "14:35")).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["raw_chart"], engine_output(), "{}", uri);
    }

    let (status, body) = post(&h.app, "/birth_chart?detailed=off", birth("1999-05-05", "14:35")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("raw_chart").is_none());

    let (status, _) = post(&h.app, "/birth_chart?detailed=maybe", birth("1999-05-05", "14:35")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_name_uses_default() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let body = json!({"date": "1999-05-05", "time": "14:35", "place": "Chennai"});
    let (status, body) = post(&h.app, "/birth_chart", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["birth_data"]["name"], "User");
    assert_eq!(h.engine_request.lock().unwrap().as_ref().unwrap().name, "User");
}

#[tokio::test]
async fn test_offset_follows_dst_at_birth_instant() {
    let h = harness(GeoBehaviour::Found, Some("America/New_York"));
    let (_, winter) = post(&h.app, "/birth_chart", birth("2020-01-15", "10:00")).await;
    let (_, summer) = post(&h.app, "/birth_chart", birth("2020-07-15", "10:00")).await;

    assert_eq!(winter["birth_data"]["tz_offset"], json!(-5.0));
    assert_eq!(summer["birth_data"]["tz_offset"], json!(-4.0));
}

#[tokio::test]
async fn test_invalid_input_rejected_before_network() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));

    let (status, body) = post(&h.app, "/birth_chart", birth("not-a-date", "14:35")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "date");
    assert!(body["detail"].as_str().unwrap().contains("YYYY-MM-DD"));

    let (status, body) = post(&h.app, "/birth_chart", birth("05-01-23", "14:35")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "date");

    let (status, body) = post(&h.app, "/planets", birth("1999-05-05", "25:99")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "time");

    let (status, body) = post(&h.app, "/dashas", json!({"date": "1999-05-05", "time": "14:35", "place": " "})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "place");

    let (status, _) = post(&h.app, "/birth_chart", json!({"date": "1999-05-05"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(h.geocode_calls.load(Ordering::SeqCst), 0);
    assert!(h.engine_request.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_geocoding_failures_map_to_distinct_statuses() {
    let cases = [
        (GeoBehaviour::Missing, StatusCode::NOT_FOUND),
        (GeoBehaviour::Timeout, StatusCode::GATEWAY_TIMEOUT),
        (GeoBehaviour::Broken, StatusCode::SERVICE_UNAVAILABLE),
    ];
    for (behaviour, expected) in cases {
        let h = harness(behaviour, Some("Asia/Kolkata"));
        let (status, body) = post(&h.app, "/birth_chart", birth("1999-05-05", "14:35")).await;
        assert_eq!(status, expected);
        assert!(body["detail"].is_string());
        assert!(h.engine_request.lock().unwrap().is_none());
    }

    let h = harness(GeoBehaviour::Missing, Some("Asia/Kolkata"));
    let (_, body) = post(&h.app, "/birth_chart", birth("1999-05-05", "14:35")).await;
    assert!(body["detail"].as_str().unwrap().contains("Karimangalam, India"));
}

#[tokio::test]
async fn test_unknown_timezone_is_server_error() {
    let h = harness(GeoBehaviour::Found, None);
    let (status, body) = post(&h.app, "/birth_chart", birth("1999-05-05", "14:35")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("timezone"));
}

#[tokio::test]
async fn test_divisional_chart_lookup() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    for division in ["9", "d9", "D9"] {
        let (status, body) = post(&h.app, &format!("/charts/{}", division), birth("1999-05-05", "14:35")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["division"], "D9");
        assert_eq!(body["houses"][0]["occupants"][0], json!({"planet": "Sun", "sign": "Leo"}));
    }

    let (status, body) = post(&h.app, "/charts/D99", birth("1999-05-05", "14:35")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["available"], json!(["D1", "D9", "D10"]));
}

#[tokio::test]
async fn test_planets_view() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let (status, body) = post(&h.app, "/planets", birth("1999-05-05", "14:35")).await;

    assert_eq!(status, StatusCode::OK);
    let planets = body["planets"].as_array().unwrap();
    assert_eq!(planets.len(), 4);
    assert_eq!(planets[0]["aspects"], json!([{"type": "7th", "target": "Saturn"}]));
    let retro: Vec<bool> = planets.iter().map(|p| p["retrograde"].as_bool().unwrap()).collect();
    assert_eq!(retro, vec![false, false, true, false]);
}

#[tokio::test]
async fn test_dashas_view() {
    let h = harness(GeoBehaviour::Found, Some("Asia/Kolkata"));
    let (status, body) = post(&h.app, "/dashas", birth("1999-05-05", "14:35")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mahadashas"][0]["planet"], "Moon");
}
