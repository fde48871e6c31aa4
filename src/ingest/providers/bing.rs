// src/ingest/providers/bing.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::clean_text;
use crate::ingest::types::{FeedEntry, SourceProvider, UNKNOWN_PUBLISHED};

pub const BING_NEWS_ENDPOINT: &str = "https://api.cognitive.microsoft.com/bing/v7.0/news/search";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    value: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    name: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    provider: Vec<Publisher>,
    #[serde(rename = "datePublished")]
    date_published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

/// Bing News search (en-IN market, last day).
pub struct BingNewsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        api_key: String,
        query: String,
        timeout: Duration,
    },
}

impl BingNewsProvider {
    pub fn from_fixture(json: &str) -> Self {
        Self {
            mode: Mode::Fixture(json.to_string()),
        }
    }

    pub fn new(client: reqwest::Client, api_key: &str, query: &str, timeout: Duration) -> Self {
        Self {
            mode: Mode::Http {
                client,
                api_key: api_key.to_string(),
                query: query.to_string(),
                timeout,
            },
        }
    }

    pub fn parse_articles(body: &str) -> Result<Vec<FeedEntry>> {
        let t0 = std::time::Instant::now();
        let resp: Response = serde_json::from_str(body).context("parsing bing news json")?;

        let out = resp
            .value
            .into_iter()
            .map(|a| FeedEntry {
                title: clean_text(a.name.as_deref().unwrap_or_default()),
                summary: clean_text(a.description.as_deref().unwrap_or_default()),
                link: a.url.unwrap_or_default(),
                source: a
                    .provider
                    .into_iter()
                    .next()
                    .and_then(|p| p.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                published: a
                    .date_published
                    .unwrap_or_else(|| UNKNOWN_PUBLISHED.to_string()),
            })
            .collect();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for BingNewsProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedEntry>> {
        let out = match &self.mode {
            Mode::Fixture(s) => Self::parse_articles(s)?,
            Mode::Http {
                client,
                api_key,
                query,
                timeout,
            } => {
                tracing::info!(target: "ingest", "querying Bing News (en-IN)");
                let body = client
                    .get(BING_NEWS_ENDPOINT)
                    .query(&[
                        ("q", query.as_str()),
                        ("mkt", "en-IN"),
                        ("count", "50"),
                        ("sortBy", "Date"),
                        ("freshness", "Day"),
                    ])
                    .header("Ocp-Apim-Subscription-Key", api_key.as_str())
                    .timeout(*timeout)
                    .send()
                    .await
                    .context("bing http get()")?
                    .error_for_status()
                    .context("bing http status")?
                    .text()
                    .await
                    .context("bing http .text()")?;
                Self::parse_articles(&body)?
            }
        };
        counter!("ingest_entries_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &str {
        "Bing News"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_maps_first_provider_name() {
        let body = r#"{"value":[
          {"name":"Namma Metro Purple Line extended","description":"BMRCL opens new stretch",
           "url":"https://dh.example/m","provider":[{"name":"Deccan Herald"},{"name":"Other"}],
           "datePublished":"2025-10-06T04:30:00.0000000Z"},
          {"name":"No provider","url":"https://x.example"}
        ]}"#;
        let p = BingNewsProvider::from_fixture(body);
        let items = p.fetch_latest().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "Deccan Herald");
        assert_eq!(items[0].title, "Namma Metro Purple Line extended");
        assert_eq!(items[1].source, "Unknown");
        assert_eq!(items[1].published, "Unknown");
    }
}
