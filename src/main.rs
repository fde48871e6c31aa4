//! News Alert Feeder: binary entrypoint.
//! Boots the Axum HTTP server, wiring config, shared state, the poll
//! scheduler, and the optional Prometheus endpoint.

use anyhow::Context;
use news_alert_feeder::{api, build_app_state, metrics::Metrics, FeederConfig};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON when FEEDER_LOG_JSON=1.
/// The runtime may already have installed a subscriber; that one wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_alert_feeder=info,warn"));

    let json = std::env::var("FEEDER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        info!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = FeederConfig::load().context("loading feeder config")?;
    let autostart = cfg.autostart;
    let interval = cfg.poll_interval_minutes;
    info!(
        feeds = cfg.feeds.len(),
        keywords = cfg.keywords.len(),
        watchlist = cfg.watchlist.len(),
        interval_minutes = interval,
        newsapi = cfg.newsapi_key.is_some(),
        bing = cfg.bing_news_key.is_some(),
        "feeder config loaded"
    );

    let metrics = Metrics::install(&cfg);
    let state = build_app_state(cfg).context("building app state")?;
    if autostart {
        state.service.start_interval(interval);
    }

    let mut router = api::router(state);
    match metrics {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = ?e, "metrics endpoint disabled"),
    }

    Ok(router.into())
}
