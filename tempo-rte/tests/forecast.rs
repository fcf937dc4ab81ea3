use std::time::Duration;

use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use tempo_core::ForecastSource;
use tempo_rte::OpenDpeForecast;
use tempo_types::{ForecastConfig, TempoError};

const FEED: &str = "/assets/tempo_days_lite.json";

fn client(url: String) -> OpenDpeForecast {
    let cfg = ForecastConfig {
        enabled: true,
        url,
        request_timeout: Duration::from_millis(300),
        ..ForecastConfig::default()
    };
    OpenDpeForecast::new(reqwest::Client::new(), &cfg).expect("valid forecast config")
}

async fn feed<'a>(server: &'a MockServer, status: u16, body: &str) -> httpmock::Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET).path(FEED);
            then.status(status).header("content-type", "application/json").body(body);
        })
        .await
}

#[tokio::test]
async fn forecast_days_are_decoded() {
    let server = MockServer::start_async().await;
    let body = json!([
        {"date": "2025-01-15", "couleur": "BLEU", "probability": 0.85},
        {"date": "invalid-date", "couleur": "blanc"},
        {"date": "2025-01-17", "couleur": "Rouge"},
    ])
    .to_string();
    let mock = feed(&server, 200, &body).await;

    let days = client(server.url(FEED)).fetch_forecast().await;
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    assert_eq!(days[0].color, "bleu");
    assert_eq!(days[0].probability, Some(0.85));
    assert_eq!(days[1].color, "rouge");
    assert_eq!(days[1].probability, None);
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn http_errors_yield_an_empty_forecast() {
    for status in [404, 500, 503] {
        let server = MockServer::start_async().await;
        feed(&server, status, "").await;
        let source = client(server.url(FEED));

        let err = source.try_fetch().await.unwrap_err();
        assert_eq!(err.status_code(), Some(status), "{err}");
        assert!(source.fetch_forecast().await.is_empty());
    }
}

#[tokio::test]
async fn invalid_json_yields_an_empty_forecast() {
    let server = MockServer::start_async().await;
    feed(&server, 200, "<html>maintenance</html>").await;
    let source = client(server.url(FEED));

    assert!(matches!(source.try_fetch().await, Err(TempoError::Parse(_))));
    assert!(source.fetch_forecast().await.is_empty());
}

#[tokio::test]
async fn unreachable_feed_yields_an_empty_forecast() {
    let source = client("http://127.0.0.1:9/assets/tempo_days_lite.json".to_string());
    assert!(matches!(source.try_fetch().await, Err(TempoError::Network(_))));
    assert!(source.fetch_forecast().await.is_empty());
}

#[tokio::test]
async fn slow_feed_times_out_to_an_empty_forecast() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(FEED);
            then.status(200).delay(Duration::from_secs(3)).body("[]");
        })
        .await;
    let source = client(server.url(FEED));

    let err = source.try_fetch().await.unwrap_err();
    assert_eq!(err.reason_key(), "network_error");
    assert!(source.fetch_forecast().await.is_empty());
}

#[test]
fn invalid_forecast_configuration_is_rejected() {
    let bad_url = ForecastConfig { url: "not a url".to_string(), ..ForecastConfig::default() };
    let err = OpenDpeForecast::new(reqwest::Client::new(), &bad_url).unwrap_err();
    assert_eq!(err.reason_key(), "invalid_config");

    let no_interval = ForecastConfig { refresh_interval: Duration::ZERO, ..ForecastConfig::default() };
    assert!(OpenDpeForecast::new(reqwest::Client::new(), &no_interval).is_err());

    assert!(OpenDpeForecast::from_config(&ForecastConfig::default()).is_ok());
}
