// src/ingest/providers/newsapi.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::clean_text;
use crate::ingest::types::{FeedEntry, SourceProvider, UNKNOWN_PUBLISHED};

pub const NEWSAPI_ENDPOINT: &str = "https://newsapi.org/v2/everything";
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<ArticleSource>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// NewsAPI `everything` search restricted to the configured domains.
pub struct NewsApiProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        query: String,
        domains: String,
        timeout: Duration,
    },
}

impl NewsApiProvider {
    pub fn from_fixture(json: &str) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
        }
    }

    pub fn new(
        client: reqwest::Client,
        api_key: &str,
        query: &str,
        domains: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            mode: Mode::Http {
                client,
                endpoint: NEWSAPI_ENDPOINT.to_string(),
                api_key: api_key.to_string(),
                query: query.to_string(),
                domains: domains.to_string(),
                timeout,
            },
        }
    }

    pub fn parse_articles(body: &str) -> Result<Vec<FeedEntry>> {
        let t0 = std::time::Instant::now();
        let resp: Response = serde_json::from_str(body).context("parsing newsapi json")?;
        if resp.status.as_deref() == Some("error") {
            bail!(
                "newsapi error: {}",
                resp.message.as_deref().unwrap_or("unknown")
            );
        }

        let out = resp
            .articles
            .into_iter()
            .map(|a| FeedEntry {
                title: clean_text(a.title.as_deref().unwrap_or_default()),
                summary: clean_text(a.description.as_deref().unwrap_or_default()),
                link: a.url.unwrap_or_default(),
                source: a
                    .source
                    .and_then(|s| s.name)
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                published: a
                    .published_at
                    .unwrap_or_else(|| UNKNOWN_PUBLISHED.to_string()),
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NewsApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>> {
        let out = match &self.mode {
            Mode::Fixture(s) => Self::parse_articles(s)?,
            Mode::Http {
                client,
                endpoint,
                api_key,
                query,
                domains,
                timeout,
            } => {
                tracing::info!(target: "ingest", "querying NewsAPI");
                let body = client
                    .get(endpoint)
                    .query(&[
                        ("q", query.as_str()),
                        ("language", "en"),
                        ("pageSize", "50"),
                        ("sortBy", "publishedAt"),
                        ("apiKey", api_key.as_str()),
                        ("domains", domains.as_str()),
                    ])
                    .timeout(*timeout)
                    .send()
                    .await
                    .context("newsapi http get()")?
                    .error_for_status()
                    .context("newsapi http status")?
                    .text()
                    .await
                    .context("newsapi http .text()")?;
                Self::parse_articles(&body)?
            }
        };
        counter!("ingest_entries_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        "NewsAPI"
    }
}
