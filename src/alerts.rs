//! Bounded in-memory ring of matched news entries, newest first.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::types::FeedEntry;
use crate::matcher::{MatchHit, MatchKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub published: String,
    pub published_ts: Option<i64>,
    pub matched_at: String,
    pub matched: String,
    pub match_kind: MatchKind,
}

impl Alert {
    pub fn from_entry(entry: FeedEntry, hit: MatchHit, seen_id: &str) -> Self {
        let published_ts = entry.published_ts();
        Self {
            id: short_hash(seen_id),
            title: entry.title,
            summary: entry.summary,
            link: entry.link,
            source: entry.source,
            published: entry.published,
            published_ts,
            matched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            matched: hit.label,
            match_kind: hit.kind,
        }
    }
}

/// First 6 bytes of the sha256 digest, hex encoded.
fn short_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Filters for [`AlertBuffer::list`].
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub limit: usize,
    /// Exact source name.
    pub source: Option<String>,
    /// Case-insensitive substring of title + summary.
    pub contains: Option<String>,
}

#[derive(Debug)]
pub struct AlertBuffer {
    inner: Mutex<VecDeque<Alert>>,
    cap: usize,
}

impl AlertBuffer {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(cap.min(10_000))),
            cap,
        }
    }

    /// Insert at the front; drops the oldest alerts beyond capacity.
    pub fn push(&self, alert: Alert) {
        let mut v = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        v.push_front(alert);
        v.truncate(self.cap);
    }

    /// Returns the filtered total and at most `q.limit` alerts, newest first.
    pub fn list(&self, q: &AlertQuery) -> (usize, Vec<Alert>) {
        let v = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let needle = q.contains.as_deref().map(str::to_lowercase);
        let matching: Vec<&Alert> = v
            .iter()
            .filter(|a| q.source.as_deref().map_or(true, |s| a.source == s))
            .filter(|a| {
                needle.as_deref().map_or(true, |n| {
                    format!("{}{}", a.title, a.summary).to_lowercase().contains(n)
                })
            })
            .collect();
        let count = matching.len();
        let items = matching.into_iter().take(q.limit).cloned().collect();
        (count, items)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(title: &str, source: &str) -> Alert {
        let entry = FeedEntry {
            title: title.into(),
            summary: "summary text".into(),
            link: format!("https://example.in/{title}"),
            source: source.into(),
            published: "Unknown".into(),
        };
        let hit = MatchHit {
            kind: MatchKind::Keyword,
            label: "x".into(),
        };
        Alert::from_entry(entry, hit, title)
    }

    fn all(limit: usize) -> AlertQuery {
        AlertQuery {
            limit,
            ..Default::default()
        }
    }

    #[test]
    fn never_exceeds_capacity_and_keeps_newest() {
        let buf = AlertBuffer::with_capacity(3);
        for i in 0..5 {
            buf.push(alert(&format!("t{i}"), "S"));
        }
        assert_eq!(buf.len(), 3);
        let (count, items) = buf.list(&all(10));
        assert_eq!(count, 3);
        let titles: Vec<_> = items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["t4", "t3", "t2"]);
    }

    #[test]
    fn filters_by_source_and_text() {
        let buf = AlertBuffer::with_capacity(10);
        buf.push(alert("Metro fares revised", "Deccan Herald"));
        buf.push(alert("RBI holds rates", "Mint"));
        buf.push(alert("Metro phase 3 delayed", "Mint"));

        let q = AlertQuery {
            limit: 10,
            source: Some("Mint".into()),
            contains: Some("METRO".into()),
        };
        let (count, items) = buf.list(&q);
        assert_eq!(count, 1);
        assert_eq!(items[0].title, "Metro phase 3 delayed");
    }

    #[test]
    fn count_is_reported_before_limit() {
        let buf = AlertBuffer::with_capacity(10);
        for i in 0..4 {
            buf.push(alert(&format!("t{i}"), "S"));
        }
        let (count, items) = buf.list(&all(2));
        assert_eq!(count, 4);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn ids_are_short_hex() {
        let a = alert("x", "S");
        assert_eq!(a.id.len(), 12);
        assert!(a.id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn clear_empties_buffer() {
        let buf = AlertBuffer::with_capacity(2);
        buf.push(alert("a", "S"));
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 2);
    }
}
