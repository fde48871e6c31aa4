// src/ingest/types.rs
use anyhow::Result;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

/// Placeholder for entries whose source gives no publish date.
pub const UNKNOWN_PUBLISHED: &str = "Unknown";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,    // feed title or API publisher name
    pub published: String, // raw date string as the source wrote it
}

impl FeedEntry {
    /// Unix seconds for `published` when it is RFC 2822 or RFC 3339.
    pub fn published_ts(&self) -> Option<i64> {
        parse_published(&self.published)
    }
}

pub fn parse_published(raw: &str) -> Option<i64> {
    let s = raw.trim();
    OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
        .map(|dt| dt.unix_timestamp())
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> &str;
}

/// Builds the providers for one poll from the current feed list.
pub trait SourceFactory: Send + Sync {
    fn providers(&self, feeds: &[String]) -> Vec<Box<dyn SourceProvider>>;
    fn newsapi_enabled(&self) -> bool {
        false
    }
    fn bing_enabled(&self) -> bool {
        false
    }
}
