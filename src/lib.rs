// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod alerts;
pub mod api;
pub mod catalog;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod matcher;
pub mod metrics;
pub mod service;
pub mod state;

use std::sync::Arc;

use anyhow::Result;

pub use crate::api::{router, AppState};
pub use crate::config::FeederConfig;
pub use crate::service::FeederService;

use crate::ingest::providers::HttpSourceFactory;
use crate::ingest::types::SourceFactory;
use crate::state::FeederState;

/// Wire state + service with the production HTTP sources.
pub fn build_app_state(config: FeederConfig) -> Result<AppState> {
    let sources = HttpSourceFactory::from_config(&config)?;
    build_app_state_with(config, Arc::new(sources))
}

/// Same as [`build_app_state`] with a caller-supplied source factory.
pub fn build_app_state_with(
    config: FeederConfig,
    sources: Arc<dyn SourceFactory>,
) -> Result<AppState> {
    let state = Arc::new(FeederState::from_config(config)?);
    let service = FeederService::new(state, sources);
    Ok(AppState::new(service))
}
