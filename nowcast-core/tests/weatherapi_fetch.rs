//! Integration tests for WeatherApiFetcher using wiremock.
//!
//! Both endpoints are mocked so each test controls which half of the join
//! succeeds.

mod common;

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use nowcast_core::{
    Coordinate, Endpoint, FetchError, WeatherApiFetcher, WeatherSource, hourly_window,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> WeatherApiFetcher {
    WeatherApiFetcher::builder("KEY".to_string())
        .base_url(format!("{}/v1", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/{endpoint}")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn test_both_succeed_merges_snapshot() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ok_json(common::current_body())).await;
    mount(&server, "forecast.json", ok_json(common::forecast_body(7))).await;

    let snapshot = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap();

    assert_eq!(snapshot.location.name, "Moscow");
    assert_eq!(snapshot.current.temperature_c, 17.3);
    let forecast = snapshot.forecast.expect("forecast present");
    assert_eq!(forecast.days.len(), 7);
    assert!(forecast.days.iter().all(|d| d.hours.len() == 24));
}

#[tokio::test]
async fn test_requests_carry_key_coordinate_and_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "KEY"))
        .and(query_param("q", "55.7558,37.6173"))
        .respond_with(ok_json(common::current_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", "KEY"))
        .and(query_param("q", "55.7558,37.6173"))
        .and(query_param("days", "7"))
        .respond_with(ok_json(common::forecast_body(7)))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch(Coordinate::DEFAULT).await;
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn test_round_trip_preserves_source_fields() {
    let server = MockServer::start().await;
    let current = common::current_body();
    let forecast = common::forecast_body(2);
    mount(&server, "current.json", ok_json(current.clone())).await;
    mount(&server, "forecast.json", ok_json(forecast.clone())).await;

    let snapshot = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap();

    let loc = &current["location"];
    assert_eq!(snapshot.location.name, loc["name"].as_str().unwrap());
    assert_eq!(snapshot.location.latitude, loc["lat"].as_f64().unwrap());
    assert_eq!(snapshot.location.longitude, loc["lon"].as_f64().unwrap());
    assert_eq!(snapshot.location.localtime.as_deref(), loc["localtime"].as_str());

    let cur = &current["current"];
    assert_eq!(snapshot.current.temperature_c, cur["temp_c"].as_f64().unwrap());
    assert_eq!(snapshot.current.feels_like_c, cur["feelslike_c"].as_f64().unwrap());
    assert_eq!(snapshot.current.wind_kph, cur["wind_kph"].as_f64().unwrap());
    assert_eq!(u64::from(snapshot.current.humidity_pct), cur["humidity"].as_u64().unwrap());
    assert_eq!(snapshot.current.condition.text, cur["condition"]["text"].as_str().unwrap());
    assert_eq!(snapshot.current.condition.icon, cur["condition"]["icon"].as_str().unwrap());
    assert_eq!(snapshot.current.condition.code, cur["condition"]["code"].as_i64().unwrap());

    let days = snapshot.forecast.unwrap().days;
    let source_days = forecast["forecast"]["forecastday"].as_array().unwrap();
    assert_eq!(days.len(), source_days.len());
    for (day, src) in days.iter().zip(source_days) {
        assert_eq!(day.date, src["date"].as_str().unwrap());
        assert_eq!(day.summary.max_temp_c, src["day"]["maxtemp_c"].as_f64().unwrap());
        assert_eq!(day.summary.min_temp_c, src["day"]["mintemp_c"].as_f64().unwrap());
        assert_eq!(day.summary.avg_temp_c, src["day"]["avgtemp_c"].as_f64().unwrap());
        assert_eq!(day.summary.condition.code, src["day"]["condition"]["code"].as_i64().unwrap());

        let src_hours = src["hour"].as_array().unwrap();
        assert_eq!(day.hours.len(), src_hours.len());
        for (hour, src_hour) in day.hours.iter().zip(src_hours) {
            assert_eq!(hour.time, src_hour["time"].as_str().unwrap());
            assert_eq!(hour.temperature_c, src_hour["temp_c"].as_f64().unwrap());
            assert_eq!(hour.condition.icon, src_hour["condition"]["icon"].as_str().unwrap());
        }
    }
}

#[tokio::test]
async fn test_current_failure_fails_whole_fetch() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ResponseTemplate::new(500).set_body_string("boom")).await;
    mount(&server, "forecast.json", ok_json(common::forecast_body(7))).await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    match err {
        FetchError::Status { endpoint, status, body } => {
            assert_eq!(endpoint, Endpoint::Current);
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_forecast_failure_fails_whole_fetch() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ok_json(common::current_body())).await;
    mount(
        &server,
        "forecast.json",
        ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 2008, "message": "API key has been disabled."}
        })),
    )
    .await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { endpoint: Endpoint::Forecast, .. }));
    assert!(err.to_string().contains("403"), "Error should mention status: {err}");
}

#[tokio::test]
async fn test_both_failing_reports_current_first() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ResponseTemplate::new(502)).await;
    mount(&server, "forecast.json", ResponseTemplate::new(503)).await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { endpoint: Endpoint::Current, .. }));
}

#[tokio::test]
async fn test_empty_body_is_no_data() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ok_json(common::current_body())).await;
    mount(&server, "forecast.json", ResponseTemplate::new(200)).await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::NoData(Endpoint::Forecast)));
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ResponseTemplate::new(200).set_body_string("<html>")).await;
    mount(&server, "forecast.json", ok_json(common::forecast_body(7))).await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { endpoint: Endpoint::Current, .. }));
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ok_json(common::current_body())).await;
    mount(
        &server,
        "forecast.json",
        ok_json(serde_json::json!({"forecast": {"forecastday": [{"date": 20250512}]}})),
    )
    .await;

    let err = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { endpoint: Endpoint::Forecast, .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let fetcher = WeatherApiFetcher::builder("KEY".to_string())
        .base_url("http://127.0.0.1:1/v1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = fetcher.fetch(Coordinate::DEFAULT).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { endpoint: Endpoint::Current, .. }), "{err}");
}

#[tokio::test]
async fn test_invalid_inputs_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch(Coordinate::new(f64::NAN, 0.0)).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidRequest(_)));

    let bad_base = WeatherApiFetcher::builder("KEY".to_string())
        .base_url("::not a url::")
        .build()
        .unwrap();
    let err = bad_base.fetch(Coordinate::DEFAULT).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_requests_run_concurrently() {
    let server = MockServer::start().await;
    let delay = Duration::from_secs(1);
    mount(&server, "current.json", ok_json(common::current_body()).set_delay(delay)).await;
    mount(&server, "forecast.json", ok_json(common::forecast_body(7)).set_delay(delay)).await;

    let started = Instant::now();
    let result = fetcher(&server).fetch(Coordinate::DEFAULT).await;
    let elapsed = started.elapsed();

    assert!(result.is_ok());
    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 2);

    // one after the other would take at least 2 * delay
    assert!(elapsed >= delay);
    assert!(elapsed < delay * 7 / 4, "requests were not joined concurrently: {elapsed:?}");
}

#[tokio::test]
async fn test_fetched_forecast_feeds_hourly_window() {
    let server = MockServer::start().await;
    mount(&server, "current.json", ok_json(common::current_body())).await;
    mount(&server, "forecast.json", ok_json(common::forecast_body(7))).await;

    let snapshot = fetcher(&server).fetch(Coordinate::DEFAULT).await.unwrap();
    let now = NaiveDate::from_ymd_opt(2025, 5, 12).unwrap().and_hms_opt(15, 4, 0).unwrap();

    let window = hourly_window(snapshot.forecast.as_ref(), now);

    assert_eq!(window.len(), 24);
    assert_eq!(window[0].time, "2025-05-12 15:00");
    assert_eq!(window[9].time, "2025-05-13 00:00");
    assert_eq!(window[23].time, "2025-05-13 14:00");
}
