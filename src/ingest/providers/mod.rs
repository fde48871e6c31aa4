pub mod bing;
pub mod newsapi;
pub mod rss;

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::FeederConfig;
use crate::ingest::types::{SourceFactory, SourceProvider};

use self::{bing::BingNewsProvider, newsapi::NewsApiProvider, rss::RssProvider};

/// Production factory: one RSS provider per feed URL, plus NewsAPI / Bing
/// when their keys are configured. All share one HTTP client.
pub struct HttpSourceFactory {
    client: reqwest::Client,
    timeout: Duration,
    news_query: String,
    newsapi_domains: String,
    newsapi_key: Option<String>,
    bing_key: Option<String>,
}

impl HttpSourceFactory {
    pub fn from_config(cfg: &FeederConfig) -> Result<Self> {
        let timeout = Duration::from_secs(cfg.fetch_timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(concat!("news-alert-feeder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            timeout,
            news_query: cfg.news_query.clone(),
            newsapi_domains: cfg.newsapi_domains_param(),
            newsapi_key: cfg.newsapi_key.clone(),
            bing_key: cfg.bing_news_key.clone(),
        })
    }
}

impl SourceFactory for HttpSourceFactory {
    fn providers(&self, feeds: &[String]) -> Vec<Box<dyn SourceProvider>> {
        let mut out: Vec<Box<dyn SourceProvider>> = feeds
            .iter()
            .map(|url| {
                Box::new(RssProvider::from_url(url, self.client.clone(), self.timeout))
                    as Box<dyn SourceProvider>
            })
            .collect();
        if let Some(key) = &self.newsapi_key {
            out.push(Box::new(NewsApiProvider::new(
                self.client.clone(),
                key,
                &self.news_query,
                &self.newsapi_domains,
                self.timeout,
            )));
        }
        if let Some(key) = &self.bing_key {
            out.push(Box::new(BingNewsProvider::new(
                self.client.clone(),
                key,
                &self.news_query,
                self.timeout,
            )));
        }
        out
    }

    fn newsapi_enabled(&self) -> bool {
        self.newsapi_key.is_some()
    }

    fn bing_enabled(&self) -> bool {
        self.bing_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_providers_only_with_keys() {
        let mut cfg = FeederConfig::default();
        let f = HttpSourceFactory::from_config(&cfg).unwrap();
        let feeds = vec!["https://a/rss".to_string(), "https://b/rss".to_string()];
        assert_eq!(f.providers(&feeds).len(), 2);
        assert!(!f.newsapi_enabled());

        cfg.newsapi_key = Some("k1".into());
        cfg.bing_news_key = Some("k2".into());
        let f = HttpSourceFactory::from_config(&cfg).unwrap();
        let names: Vec<String> = f
            .providers(&feeds)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["https://a/rss", "https://b/rss", "NewsAPI", "Bing News"]);
        assert!(f.newsapi_enabled() && f.bing_enabled());
    }
}
