// tests/metrics.rs
//
// One test per binary: the Prometheus recorder is process-global.

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use news_alert_feeder::config::FeederConfig;
use news_alert_feeder::ingest::providers::rss::RssProvider;
use news_alert_feeder::ingest::types::{SourceFactory, SourceProvider};
use news_alert_feeder::metrics::Metrics;
use news_alert_feeder::{build_app_state_with, router};

struct CityOnly;

impl SourceFactory for CityOnly {
    fn providers(&self, _feeds: &[String]) -> Vec<Box<dyn SourceProvider>> {
        vec![Box::new(RssProvider::from_fixture(
            "city",
            include_str!("fixtures/city_rss.xml"),
        ))]
    }
}

#[tokio::test]
async fn metrics_endpoint_exposes_ingest_series_after_poll() {
    let cfg = FeederConfig {
        feeds: vec!["fixture://city".into()],
        keywords: vec![r"\bflood\b".into()],
        alerts_capacity: 25,
        ..FeederConfig::default()
    };
    let metrics = Metrics::install(&cfg).expect("first install succeeds");
    assert!(Metrics::install(&cfg).is_err(), "second install must fail");

    let state = build_app_state_with(cfg, Arc::new(CityOnly)).expect("state");
    let app = router(state).merge(metrics.router());

    let poll = Request::builder()
        .method(Method::POST)
        .uri("/poll")
        .body(Body::empty())
        .expect("build /poll");
    let resp = app.clone().oneshot(poll).await.expect("oneshot /poll");
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .expect("build /metrics");
    let resp = app.oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    for series in [
        "ingest_runs_total",
        "ingest_entries_total",
        "ingest_alerts_total",
        "alerts_buffer_len",
        "alerts_buffer_capacity",
    ] {
        assert!(text.contains(series), "missing {series} in:\n{text}");
    }
}
