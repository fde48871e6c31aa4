//! # Feeder service
//! Owns the shared state and the single interval poll job.
//!
//! - `poll_once` runs the fetch → match → dedup → store pipeline once.
//!   Manual and scheduled polls never overlap (async mutex).
//! - `start_interval` spawns the job (first run immediately) or, when one is
//!   already running, reschedules it so the next run is one new period away.
//! - `stop_interval` aborts the job.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::ingest::{self, types::SourceFactory, PollStats};
use crate::state::FeederState;

/// One year; longer intervals are rejected by the API and clamped here.
pub const MAX_INTERVAL_MINUTES: u64 = 525_600;

pub struct FeederService {
    state: Arc<FeederState>,
    sources: Arc<dyn SourceFactory>,
    poll_lock: tokio::sync::Mutex<()>,
    job: Mutex<Option<IntervalJob>>,
    last_run: Mutex<Option<DateTime<Utc>>>,
}

struct IntervalJob {
    minutes: u64,
    handle: JoinHandle<()>,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
}

/// Snapshot returned by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub started: bool,
    pub interval_minutes: u64,
    pub job_exists: bool,
    pub next_run_time: Option<String>,
    pub last_run_time: Option<String>,
    pub feeds_count: usize,
    pub keywords_count: usize,
    pub watchlist_count: usize,
    pub seen_count: usize,
    pub seen_capacity: usize,
    pub alerts_count: usize,
    pub alerts_capacity: usize,
    pub newsapi_enabled: bool,
    pub bing_enabled: bool,
}

impl FeederService {
    pub fn new(state: Arc<FeederState>, sources: Arc<dyn SourceFactory>) -> Arc<Self> {
        Arc::new(Self {
            state,
            sources,
            poll_lock: tokio::sync::Mutex::new(()),
            job: Mutex::new(None),
            last_run: Mutex::new(None),
        })
    }

    pub fn state(&self) -> &FeederState {
        &self.state
    }

    /// Run one poll over all current sources.
    pub async fn poll_once(&self) -> PollStats {
        let _guard = self.poll_lock.lock().await;
        info!(target: "scheduler", "starting news poll");

        let feeds = self.state.catalog().feeds().to_vec();
        let providers = self.sources.providers(&feeds);
        let stats = ingest::run_once(&providers, &self.state).await;

        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        info!(
            target: "scheduler",
            sources = stats.sources,
            fetched = stats.fetched,
            matched = stats.matched,
            duplicates = stats.duplicates,
            errors = stats.errors,
            "poll complete"
        );
        stats
    }

    /// Start polling every `minutes` (clamped to `1..=MAX_INTERVAL_MINUTES`),
    /// or reschedule a running job.
    pub fn start_interval(self: &Arc<Self>, minutes: u64) {
        let minutes = minutes.clamp(1, MAX_INTERVAL_MINUTES);
        let period = period_for(minutes);
        let mut job = self.job.lock().unwrap_or_else(PoisonError::into_inner);

        let rescheduled = match job.take() {
            Some(old) => {
                old.handle.abort();
                true
            }
            None => false,
        };
        let delay = if rescheduled { period } else { Duration::ZERO };
        let now = Instant::now();
        let first_tick = now.checked_add(delay).unwrap_or(now);

        let next_run = Arc::new(Mutex::new(after_now(delay)));
        let handle = spawn_job(Arc::downgrade(self), first_tick, period, next_run.clone());
        *job = Some(IntervalJob {
            minutes,
            handle,
            next_run,
        });

        if rescheduled {
            info!(target: "scheduler", minutes, "rescheduled poll job");
        } else {
            info!(target: "scheduler", minutes, "scheduler started");
        }
    }

    pub fn stop_interval(&self) {
        let mut job = self.job.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = job.take() {
            old.handle.abort();
            info!(target: "scheduler", "scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.job
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn status(&self) -> ServiceStatus {
        let (started, interval_minutes, next_run_time) = {
            let job = self.job.lock().unwrap_or_else(PoisonError::into_inner);
            match job.as_ref() {
                Some(j) => {
                    let next = *j.next_run.lock().unwrap_or_else(PoisonError::into_inner);
                    (true, j.minutes, next.map(iso))
                }
                None => (false, self.state.config.poll_interval_minutes, None),
            }
        };
        let last_run_time = self
            .last_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(iso);
        let (seen_count, seen_capacity) = {
            let seen = self.state.seen();
            (seen.len(), seen.capacity())
        };
        let (feeds_count, keywords_count, watchlist_count) = {
            let c = self.state.catalog();
            (c.feeds().len(), c.keywords().len(), c.watchlist().len())
        };

        ServiceStatus {
            started,
            interval_minutes,
            job_exists: started,
            next_run_time,
            last_run_time,
            feeds_count,
            keywords_count,
            watchlist_count,
            seen_count,
            seen_capacity,
            alerts_count: self.state.alerts.len(),
            alerts_capacity: self.state.alerts.capacity(),
            newsapi_enabled: self.sources.newsapi_enabled(),
            bing_enabled: self.sources.bing_enabled(),
        }
    }
}

impl Drop for FeederService {
    fn drop(&mut self) {
        if let Some(job) = self
            .job
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            job.handle.abort();
        }
    }
}

// The task holds a Weak so a dropped service ends its own job.
fn spawn_job(
    svc: Weak<FeederService>,
    first_tick: Instant,
    period: Duration,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            *next_run.lock().unwrap_or_else(PoisonError::into_inner) = after_now(period);
            let Some(service) = svc.upgrade() else {
                break;
            };
            service.poll_once().await;
        }
    })
}

fn period_for(minutes: u64) -> Duration {
    let secs = minutes
        .checked_mul(60)
        .unwrap_or(MAX_INTERVAL_MINUTES * 60);
    Duration::from_secs(secs)
}

// None when the wall clock cannot represent the instant.
fn after_now(d: Duration) -> Option<DateTime<Utc>> {
    let delta = chrono::Duration::from_std(d).ok()?;
    Utc::now().checked_add_signed(delta)
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
