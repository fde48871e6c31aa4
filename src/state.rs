//! Shared in-process state: catalog, seen ids and the alert ring.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::alerts::AlertBuffer;
use crate::catalog::Catalog;
use crate::config::FeederConfig;
use crate::dedup::SeenIds;

#[derive(Debug)]
pub struct FeederState {
    pub config: FeederConfig,
    catalog: RwLock<Catalog>,
    seen: Mutex<SeenIds>,
    pub alerts: AlertBuffer,
}

impl FeederState {
    pub fn from_config(config: FeederConfig) -> Result<Self> {
        let catalog = Catalog::new(
            config.feeds.clone(),
            config.keywords.clone(),
            config.watchlist.clone(),
        )?;
        Ok(Self {
            seen: Mutex::new(SeenIds::with_capacity(config.seen_capacity)),
            alerts: AlertBuffer::with_capacity(config.alerts_capacity),
            catalog: RwLock::new(catalog),
            config,
        })
    }

    pub fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn catalog_mut(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seen(&self) -> MutexGuard<'_, SeenIds> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
