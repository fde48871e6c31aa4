use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::alerts::AlertQuery;
use crate::catalog::CatalogError;
use crate::matcher::WatchEntry;
use crate::service::{FeederService, MAX_INTERVAL_MINUTES};

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FeederService>,
}

impl AppState {
    pub fn new(service: Arc<FeederService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/poll", post(poll_now))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/feeds", get(list_feeds).post(set_feeds))
        .route("/feeds/add", post(add_feed))
        .route("/feeds/remove", delete(remove_feed))
        .route("/keywords", get(list_keywords).post(set_keywords))
        .route("/keywords/add", post(add_keyword))
        .route("/keywords/remove", delete(remove_keyword))
        .route("/watchlist", get(list_watchlist).post(set_watchlist))
        .route("/watchlist/add", post(add_watch))
        .route("/watchlist/remove", delete(remove_watch))
        .route("/alerts", get(list_alerts).delete(clear_alerts))
        .route("/seen", get(list_seen).delete(clear_seen))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

/// Error body mirrors `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        tracing::debug!(target: "api", %status, %detail, "request rejected");
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) => ApiError::NotFound(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        ApiError::BadRequest(r.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        ApiError::BadRequest(r.body_text())
    }
}

/// `Query` whose rejections use the `{"detail"}` body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct Query<T>(T);

/// `Json` body whose rejections use the `{"detail"}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct JsonBody<T>(T);

type ApiResult = Result<Json<Value>, ApiError>;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/* ----------------------------
Service control
---------------------------- */

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "time": now_iso() }))
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.service.status()))
}

async fn poll_now(State(state): State<AppState>) -> Json<Value> {
    let stats = state.service.poll_once().await;
    Json(json!({
        "message": "Poll executed",
        "alerts_count": state.service.state().alerts.len(),
        "stats": stats,
    }))
}

#[derive(Deserialize)]
struct StartQuery {
    minutes: Option<u64>,
}

async fn start(State(state): State<AppState>, Query(q): Query<StartQuery>) -> ApiResult {
    let minutes = match q.minutes {
        Some(m) if !(1..=MAX_INTERVAL_MINUTES).contains(&m) => {
            return Err(ApiError::BadRequest(format!(
                "minutes must be between 1 and {}",
                MAX_INTERVAL_MINUTES
            )))
        }
        Some(m) => m,
        None => state.service.state().config.poll_interval_minutes,
    };
    state.service.start_interval(minutes);
    Ok(Json(json!({
        "message": format!("Scheduler started/rescheduled for every {} minutes", minutes),
        "status": state.service.status(),
    })))
}

async fn stop(State(state): State<AppState>) -> Json<Value> {
    state.service.stop_interval();
    Json(json!({
        "message": "Scheduler stopped",
        "status": state.service.status(),
    }))
}

/* ----------------------------
Feeds
---------------------------- */

#[derive(Deserialize)]
struct FeedsUpdate {
    feeds: Vec<String>,
}

#[derive(Deserialize)]
struct UrlQuery {
    url: String,
}

fn feeds_body(state: &AppState, message: Option<&str>) -> Json<Value> {
    let feeds = state.service.state().catalog().feeds().to_vec();
    match message {
        Some(m) => Json(json!({ "message": m, "feeds": feeds })),
        None => Json(json!({ "feeds": feeds })),
    }
}

async fn list_feeds(State(state): State<AppState>) -> Json<Value> {
    feeds_body(&state, None)
}

async fn set_feeds(State(state): State<AppState>, JsonBody(body): JsonBody<FeedsUpdate>) -> ApiResult {
    state.service.state().catalog_mut().set_feeds(body.feeds)?;
    tracing::info!(target: "api", "feeds replaced");
    Ok(feeds_body(&state, Some("Feeds updated")))
}

async fn add_feed(State(state): State<AppState>, Query(q): Query<UrlQuery>) -> ApiResult {
    state.service.state().catalog_mut().add_feed(&q.url)?;
    tracing::info!(target: "api", url = %q.url, "feed added");
    Ok(feeds_body(&state, Some("Feed added")))
}

async fn remove_feed(State(state): State<AppState>, Query(q): Query<UrlQuery>) -> ApiResult {
    state.service.state().catalog_mut().remove_feed(&q.url)?;
    tracing::info!(target: "api", url = %q.url, "feed removed");
    Ok(feeds_body(&state, Some("Feed removed")))
}

/* ----------------------------
Keywords
---------------------------- */

#[derive(Deserialize)]
struct KeywordsUpdate {
    keywords: Vec<String>,
}

#[derive(Deserialize)]
struct PatternQuery {
    pattern: String,
}

fn keywords_body(state: &AppState, message: Option<&str>) -> Json<Value> {
    let keywords = state.service.state().catalog().keywords().to_vec();
    match message {
        Some(m) => Json(json!({ "message": m, "keywords": keywords })),
        None => Json(json!({ "keywords": keywords })),
    }
}

async fn list_keywords(State(state): State<AppState>) -> Json<Value> {
    keywords_body(&state, None)
}

async fn set_keywords(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<KeywordsUpdate>,
) -> ApiResult {
    state
        .service
        .state()
        .catalog_mut()
        .set_keywords(body.keywords)?;
    tracing::info!(target: "api", "keywords replaced");
    Ok(keywords_body(&state, Some("Keywords updated")))
}

async fn add_keyword(State(state): State<AppState>, Query(q): Query<PatternQuery>) -> ApiResult {
    state.service.state().catalog_mut().add_keyword(&q.pattern)?;
    tracing::info!(target: "api", pattern = %q.pattern, "keyword added");
    Ok(keywords_body(&state, Some("Keyword added")))
}

async fn remove_keyword(
    State(state): State<AppState>,
    Query(q): Query<PatternQuery>,
) -> ApiResult {
    state
        .service
        .state()
        .catalog_mut()
        .remove_keyword(&q.pattern)?;
    tracing::info!(target: "api", pattern = %q.pattern, "keyword removed");
    Ok(keywords_body(&state, Some("Keyword removed")))
}

/* ----------------------------
Watchlist
---------------------------- */

#[derive(Deserialize)]
struct WatchlistUpdate {
    watchlist: Vec<WatchEntry>,
}

#[derive(Deserialize)]
struct NameQuery {
    name: String,
}

fn watchlist_body(state: &AppState, message: Option<&str>) -> Json<Value> {
    let watchlist = state.service.state().catalog().watchlist().to_vec();
    match message {
        Some(m) => Json(json!({ "message": m, "watchlist": watchlist })),
        None => Json(json!({ "watchlist": watchlist })),
    }
}

async fn list_watchlist(State(state): State<AppState>) -> Json<Value> {
    watchlist_body(&state, None)
}

async fn set_watchlist(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<WatchlistUpdate>,
) -> ApiResult {
    state
        .service
        .state()
        .catalog_mut()
        .set_watchlist(body.watchlist)?;
    tracing::info!(target: "api", "watchlist replaced");
    Ok(watchlist_body(&state, Some("Watchlist updated")))
}

async fn add_watch(State(state): State<AppState>, JsonBody(entry): JsonBody<WatchEntry>) -> ApiResult {
    let name = entry.name.clone();
    state.service.state().catalog_mut().add_watch(entry)?;
    tracing::info!(target: "api", %name, "watchlist entry added");
    Ok(watchlist_body(&state, Some("Watchlist entry added")))
}

async fn remove_watch(State(state): State<AppState>, Query(q): Query<NameQuery>) -> ApiResult {
    state.service.state().catalog_mut().remove_watch(&q.name)?;
    tracing::info!(target: "api", name = %q.name, "watchlist entry removed");
    Ok(watchlist_body(&state, Some("Watchlist entry removed")))
}

/* ----------------------------
Alerts & seen ids
---------------------------- */

#[derive(Deserialize)]
struct AlertsParams {
    limit: Option<usize>,
    source: Option<String>,
    contains: Option<String>,
}

async fn list_alerts(State(state): State<AppState>, Query(p): Query<AlertsParams>) -> ApiResult {
    let alerts = &state.service.state().alerts;
    let cap = alerts.capacity();
    let limit = p.limit.unwrap_or(DEFAULT_LIST_LIMIT.min(cap));
    if limit < 1 || limit > cap {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            cap
        )));
    }

    let q = AlertQuery {
        limit,
        source: p.source.filter(|s| !s.is_empty()),
        contains: p.contains.filter(|s| !s.is_empty()),
    };
    let (count, items) = alerts.list(&q);
    Ok(Json(json!({ "count": count, "alerts": items })))
}

async fn clear_alerts(State(state): State<AppState>) -> Json<Value> {
    state.service.state().alerts.clear();
    tracing::info!(target: "api", "alerts cleared");
    Json(json!({ "message": "Alerts cleared" }))
}

#[derive(Deserialize)]
struct SeenParams {
    limit: Option<usize>,
}

async fn list_seen(State(state): State<AppState>, Query(p): Query<SeenParams>) -> Json<Value> {
    let seen = state.service.state().seen();
    let limit = p.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Json(json!({ "count": seen.len(), "sample": seen.sample(limit) }))
}

async fn clear_seen(State(state): State<AppState>) -> Json<Value> {
    state.service.state().seen().clear();
    tracing::info!(target: "api", "seen ids cleared");
    Json(json!({ "message": "Seen ids cleared" }))
}
