//! Sensor model against a real HTTP endpoint (wiremock) and against
//! scripted sources that control response ordering.

use async_trait::async_trait;
use serde_json::json;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Notify;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use greenhouse_twin::domain::TelemetryReading;
use greenhouse_twin::sensor::{
    DriftConfig, HttpTelemetrySource, ReconciledSensorModel, RefreshOutcome, TelemetryError,
    TelemetrySource,
};

fn seeded_drift() -> DriftConfig {
    DriftConfig {
        random_seed: Some(11),
        ..Default::default()
    }
}

async fn http_model(server: &MockServer) -> ReconciledSensorModel {
    let endpoint = format!("{}/sensor-data", server.uri());
    let source = HttpTelemetrySource::new(&endpoint, Duration::from_secs(2)).unwrap();
    ReconciledSensorModel::new(
        Arc::new(source),
        seeded_drift(),
        Duration::from_millis(100),
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn test_partial_payload_keeps_previous_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "temperature": 27.5,
            "waterLevel": 42.0
        })))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    let before = model.current();
    assert_eq!(model.refresh().await, RefreshOutcome::Live);

    let after = model.current();
    assert!(after.source_is_live);
    assert_eq!(after.temperature, 27.5);
    assert_eq!(after.water_level, 42.0);
    assert_eq!(after.humidity, before.humidity);
    assert_eq!(after.solar_output, before.solar_output);
    assert_eq!(after.energy_efficiency, before.energy_efficiency);
    assert_eq!(after.co2_saved, before.co2_saved);
    assert!(after.last_updated > before.last_updated);
}

#[tokio::test]
async fn test_sunlight_field_feeds_solar_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sunlight": 64.0 })))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    model.refresh().await;
    assert_eq!(model.current().solar_output, 64.0);
}

#[tokio::test]
async fn test_server_error_falls_back_to_simulation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    assert_eq!(model.refresh().await, RefreshOutcome::Simulated);
    let snap = model.current();
    assert!(!snap.source_is_live);
    assert_eq!(snap.status_label(), "simulated");
    assert_eq!(snap.revision, 1);
}

#[tokio::test]
async fn test_malformed_body_falls_back_to_simulation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    assert_eq!(model.refresh().await, RefreshOutcome::Simulated);
    assert!(!model.current().source_is_live);
}

#[tokio::test]
async fn test_consecutive_failures_stay_bounded() {
    let server = MockServer::start().await;
    // One live reading far below the drift envelope, then the feed dies.
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "waterLevel": 5.0 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    assert_eq!(model.refresh().await, RefreshOutcome::Live);
    assert_eq!(model.current().water_level, 5.0);

    let mut last = model.current().last_updated;
    for _ in 0..3 {
        assert_eq!(model.refresh().await, RefreshOutcome::Simulated);
        let snap = model.current();
        assert!(!snap.source_is_live);
        assert!((20.0..=100.0).contains(&snap.water_level));
        assert!(snap.last_updated > last);
        last = snap.last_updated;
    }
    assert_eq!(model.stats().simulated, 3);
}

#[tokio::test]
async fn test_recovers_when_feed_returns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sensor-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "humidity": 71.0 })))
        .mount(&server)
        .await;

    let model = http_model(&server).await;
    model.refresh().await;
    model.refresh().await;
    assert!(!model.current().source_is_live);

    assert_eq!(model.refresh().await, RefreshOutcome::Live);
    let snap = model.current();
    assert!(snap.source_is_live);
    assert_eq!(snap.humidity, 71.0);
    assert_eq!(snap.revision, 3);
}

/// First call blocks until released; later calls answer immediately.
struct GatedSource {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl TelemetrySource for GatedSource {
    async fn fetch(&self) -> Result<TelemetryReading, TelemetryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            self.entered.notify_one();
            self.release.notified().await;
            return Ok(TelemetryReading {
                humidity: Some(50.0),
                ..Default::default()
            });
        }
        Ok(TelemetryReading {
            humidity: Some(80.0),
            ..Default::default()
        })
    }
}

#[tokio::test]
async fn test_late_response_does_not_overwrite_newer_snapshot() {
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let model = Arc::new(ReconciledSensorModel::new(
        source.clone(),
        seeded_drift(),
        Duration::from_millis(100),
        Duration::from_secs(5),
    ));

    let slow = {
        let model = model.clone();
        tokio::spawn(async move { model.refresh().await })
    };
    source.entered.notified().await;

    assert_eq!(model.refresh().await, RefreshOutcome::Live);
    assert_eq!(model.current().humidity, 80.0);
    assert_eq!(model.current().revision, 2);

    source.release.notify_one();
    assert_eq!(slow.await.unwrap(), RefreshOutcome::Superseded);

    let snap = model.current();
    assert_eq!(snap.humidity, 80.0);
    assert_eq!(snap.revision, 2);
    assert_eq!(model.stats().superseded, 1);
}

#[tokio::test]
async fn test_readers_never_block_on_slow_feed() {
    let source = Arc::new(GatedSource {
        calls: AtomicUsize::new(0),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let model = Arc::new(ReconciledSensorModel::new(
        source.clone(),
        seeded_drift(),
        Duration::from_millis(100),
        Duration::from_secs(5),
    ));

    let pending = {
        let model = model.clone();
        tokio::spawn(async move { model.refresh().await })
    };
    source.entered.notified().await;

    let snap = tokio::time::timeout(Duration::from_millis(50), async { model.current() })
        .await
        .expect("current() must not wait on the feed");
    assert_eq!(snap.revision, 0);

    source.release.notify_one();
    assert_eq!(pending.await.unwrap(), RefreshOutcome::Live);
}
