// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::alerts::{Alert, AlertBuffer};
use crate::dedup::{stable_id, SeenIds};
use crate::ingest::types::{FeedEntry, SourceProvider};
use crate::matcher::KeywordMatcher;
use crate::state::FeederState;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_entries_total", "Total entries parsed from providers.");
        describe_counter!("ingest_alerts_total", "Entries stored as alerts.");
        describe_counter!(
            "ingest_dedup_total",
            "Entries skipped because their id was already seen."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("ingest_runs_total", "Completed poll runs.");
        describe_histogram!("ingest_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when the last poll finished.");
        describe_gauge!("alerts_buffer_len", "Alerts currently held in memory.");
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const MAX_TEXT_CHARS: usize = 1500;

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    // 1) HTML entity decode
    let out = html_escape::decode_html_entities(s);

    // 2) Strip HTML tags
    let out = RE_TAGS.replace_all(&out, "");

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    let out = RE_WS.replace_all(&out, " ");
    let out = out.trim();

    // 5) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out.chars().take(MAX_TEXT_CHARS).collect()
    } else {
        out.to_string()
    }
}

/// Counters for one poll (or one batch of entries).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    pub sources: usize,
    pub fetched: usize,
    pub matched: usize,
    pub duplicates: usize,
    pub errors: usize,
}

impl PollStats {
    fn absorb(&mut self, other: PollStats) {
        self.fetched += other.fetched;
        self.matched += other.matched;
        self.duplicates += other.duplicates;
    }
}

/// Dedup + match + store. Only matched entries are recorded as seen, so an
/// entry skipped today can still alert after the keyword list changes.
pub fn process_entries(
    entries: Vec<FeedEntry>,
    matcher: &KeywordMatcher,
    seen: &mut SeenIds,
    alerts: &AlertBuffer,
) -> PollStats {
    let mut stats = PollStats {
        fetched: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        let uid = stable_id(&entry.title, &entry.link);
        if seen.contains(&uid) {
            stats.duplicates += 1;
            continue;
        }
        let text = format!("{}\n{}", entry.title, entry.summary);
        let Some(hit) = matcher.find(&text) else {
            continue;
        };
        tracing::info!(
            target: "ingest",
            title = %entry.title,
            source = %entry.source,
            matched = %hit.label,
            "stored alert"
        );
        let alert = Alert::from_entry(entry, hit, &uid);
        seen.insert(uid);
        alerts.push(alert);
        stats.matched += 1;
    }

    stats
}

/// Fetch every provider in order and feed its entries through the pipeline.
/// Provider failures are logged and counted; they never abort the run.
pub async fn run_once(providers: &[Box<dyn SourceProvider>], state: &FeederState) -> PollStats {
    ensure_metrics_described();

    let mut stats = PollStats {
        sources: providers.len(),
        ..Default::default()
    };

    for p in providers {
        tracing::debug!(target: "ingest", provider = p.name(), "fetching");
        let entries = match p.fetch_latest().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                stats.errors += 1;
                continue;
            }
        };

        // Locks are taken after the await and dropped before the next fetch.
        let batch = {
            let catalog = state.catalog();
            let mut seen = state.seen();
            process_entries(entries, catalog.matcher(), &mut seen, &state.alerts)
        };
        stats.absorb(batch);
    }

    let now = chrono::Utc::now().timestamp().max(0);
    counter!("ingest_alerts_total").increment(stats.matched as u64);
    counter!("ingest_dedup_total").increment(stats.duplicates as u64);
    counter!("ingest_runs_total").increment(1);
    gauge!("ingest_last_run_ts").set(now as f64);
    gauge!("alerts_buffer_len").set(state.alerts.len() as f64);

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertQuery;

    fn entry(title: &str, link: &str) -> FeedEntry {
        FeedEntry {
            title: title.into(),
            summary: String::new(),
            link: link.into(),
            source: "Test".into(),
            published: "Unknown".into(),
        }
    }

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(&[r"\bflood\b".to_string()], &[]).unwrap()
    }

    #[test]
    fn clean_text_strips_markup_and_collapses_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b>!</p>  ";
        assert_eq!(clean_text(s), "Hello, world!");
        assert_eq!(clean_text("“Quoted” ‘text’"), "\"Quoted\" 'text'");
    }

    #[test]
    fn clean_text_caps_length() {
        let long = "x".repeat(2000);
        assert_eq!(clean_text(&long).chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn duplicate_title_and_link_stored_once() {
        let m = matcher();
        let mut seen = SeenIds::with_capacity(100);
        let alerts = AlertBuffer::with_capacity(10);

        let batch = vec![
            entry("Flood in Bellandur", "https://x/1"),
            entry("FLOOD in  Bellandur", "https://x/1"),
        ];
        let stats = process_entries(batch, &m, &mut seen, &alerts);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.duplicates, 1);

        let again = process_entries(
            vec![entry("Flood in Bellandur", "https://x/1")],
            &m,
            &mut seen,
            &alerts,
        );
        assert_eq!(again.matched, 0);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn unmatched_entries_are_not_marked_seen() {
        let m = matcher();
        let mut seen = SeenIds::with_capacity(100);
        let alerts = AlertBuffer::with_capacity(10);

        let stats = process_entries(
            vec![entry("Cricket final tonight", "https://x/2")],
            &m,
            &mut seen,
            &alerts,
        );
        assert_eq!(stats.fetched, 1);
        assert_eq!(stats.matched, 0);
        assert!(seen.is_empty());
        assert!(alerts.is_empty());
    }

    #[test]
    fn summary_text_participates_in_matching() {
        let m = matcher();
        let mut seen = SeenIds::with_capacity(100);
        let alerts = AlertBuffer::with_capacity(10);
        let mut e = entry("Weather update", "https://x/3");
        e.summary = "Flood alert issued for low-lying areas".into();

        process_entries(vec![e], &m, &mut seen, &alerts);
        let (_, items) = alerts.list(&AlertQuery {
            limit: 5,
            ..Default::default()
        });
        assert_eq!(items[0].matched, r"\bflood\b");
        assert_eq!(items[0].source, "Test");
    }
}
