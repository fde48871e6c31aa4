use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::clean_text;
use crate::ingest::types::{FeedEntry, SourceProvider, UNKNOWN_PUBLISHED};

pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/* ---- RSS 2.0 ---- */

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/* ---- Atom ---- */

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

// Atom text constructs carry a `type` attribute; only the text matters.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

pub struct RssProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
        timeout: Duration,
    },
}

impl RssProvider {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(url: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            name: url.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
                timeout,
            },
        }
    }

    async fn fetch_body(url: &str, client: &reqwest::Client, timeout: Duration) -> Result<String> {
        let resp = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("rss http get {}", url))?
            .error_for_status()
            .with_context(|| format!("rss http status {}", url))?;
        resp.text().await.context("rss http .text()")
    }
}

/// Parse an RSS 2.0 or Atom document into entries.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);

    let out = if looks_like_atom(&xml_clean) {
        parse_atom(&xml_clean)?
    } else {
        parse_rss(&xml_clean)?
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    Ok(out)
}

fn parse_rss(xml: &str) -> Result<Vec<FeedEntry>> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    let source = source_name(rss.channel.title.as_deref());

    let out = rss
        .channel
        .items
        .into_iter()
        .map(|it| FeedEntry {
            title: clean_text(it.title.as_deref().unwrap_or_default()),
            summary: clean_text(it.description.as_deref().unwrap_or_default()),
            link: it.link.unwrap_or_default().trim().to_string(),
            source: source.clone(),
            published: published_or_unknown(it.pub_date),
        })
        .collect();
    Ok(out)
}

fn parse_atom(xml: &str) -> Result<Vec<FeedEntry>> {
    let feed: AtomFeed = from_str(xml).context("parsing atom xml")?;
    let source = source_name(feed.title.as_ref().map(|t| t.value.as_str()));

    let out = feed
        .entries
        .into_iter()
        .map(|e| {
            let summary = e.summary.or(e.content).map(|t| t.value).unwrap_or_default();
            FeedEntry {
                title: clean_text(e.title.map(|t| t.value).as_deref().unwrap_or_default()),
                summary: clean_text(&summary),
                link: pick_atom_link(&e.links),
                source: source.clone(),
                published: published_or_unknown(e.published.or(e.updated)),
            }
        })
        .collect();
    Ok(out)
}

// Prefer rel="alternate" (or no rel), else the first href.
fn pick_atom_link(links: &[AtomLink]) -> String {
    links
        .iter()
        .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
        .or_else(|| links.first())
        .and_then(|l| l.href.as_deref())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn looks_like_atom(xml: &str) -> bool {
    match (xml.find("<feed"), xml.find("<rss")) {
        (Some(_), None) => true,
        (Some(f), Some(r)) => f < r,
        _ => false,
    }
}

fn source_name(title: Option<&str>) -> String {
    let t = clean_text(title.unwrap_or_default());
    if t.is_empty() {
        UNKNOWN_SOURCE.to_string()
    } else {
        t
    }
}

fn published_or_unknown(raw: Option<String>) -> String {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_PUBLISHED.to_string())
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>> {
        let out = match &self.mode {
            Mode::Fixture(s) => parse_feed(s)?,
            Mode::Http {
                url,
                client,
                timeout,
            } => {
                let body = Self::fetch_body(url, client, *timeout).await?;
                parse_feed(&body).with_context(|| format!("feed {}", url))?
            }
        };
        counter!("ingest_entries_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&ldquo;", "&#8220;")
        .replace("&rdquo;", "&#8221;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rsquo;", "&#8217;")
        .replace("&hellip;", "&#8230;")
}
