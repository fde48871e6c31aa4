// src/config/feeder.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::matcher::{validate_pattern, WatchEntry};

use super::defaults;

pub const DEFAULT_CONFIG_PATH: &str = "config/feeder.toml";
pub const ENV_CONFIG_PATH: &str = "FEEDER_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct FeederConfig {
    pub poll_interval_minutes: u64,
    pub alerts_capacity: usize,
    pub seen_capacity: usize,
    pub fetch_timeout_secs: u64,
    pub autostart: bool,
    pub feeds: Vec<String>,
    pub keywords: Vec<String>,
    pub watchlist: Vec<WatchEntry>,
    /// Boolean query sent to NewsAPI and Bing News.
    pub news_query: String,
    pub newsapi_domains: Vec<String>,
    pub newsapi_key: Option<String>,
    pub bing_news_key: Option<String>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: 10,
            alerts_capacity: 500,
            seen_capacity: 50_000,
            fetch_timeout_secs: 15,
            autostart: false,
            feeds: to_strings(defaults::RSS_FEEDS),
            keywords: to_strings(defaults::KEYWORDS),
            watchlist: defaults::watchlist(),
            news_query: defaults::NEWS_QUERY.to_string(),
            newsapi_domains: to_strings(defaults::NEWSAPI_DOMAINS),
            newsapi_key: None,
            bing_news_key: None,
        }
    }
}

/// Optional overrides read from `config/feeder.toml`. API keys stay in env.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    poll_interval_minutes: Option<u64>,
    alerts_capacity: Option<usize>,
    seen_capacity: Option<usize>,
    fetch_timeout_secs: Option<u64>,
    autostart: Option<bool>,
    feeds: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    watchlist: Option<Vec<WatchEntry>>,
    news_query: Option<String>,
    newsapi_domains: Option<Vec<String>>,
}

impl FeederConfig {
    /// Built-ins, then the TOML file, then environment overrides.
    ///
    /// File lookup:
    /// 1) $FEEDER_CONFIG_PATH (must exist)
    /// 2) config/feeder.toml (optional)
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!("FEEDER_CONFIG_PATH points to non-existent path"));
                }
                Self::from_file(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_with(|k| env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feeder config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing feeder config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(s)?;
        let mut cfg = Self::default();

        if let Some(v) = file.poll_interval_minutes {
            cfg.poll_interval_minutes = v.max(1);
        }
        if let Some(v) = file.alerts_capacity {
            cfg.alerts_capacity = v.max(1);
        }
        if let Some(v) = file.seen_capacity {
            cfg.seen_capacity = v.max(1);
        }
        if let Some(v) = file.fetch_timeout_secs {
            cfg.fetch_timeout_secs = v.max(1);
        }
        if let Some(v) = file.autostart {
            cfg.autostart = v;
        }
        if let Some(v) = file.feeds {
            cfg.feeds = clean_list(v);
        }
        if let Some(v) = file.keywords {
            cfg.keywords = clean_list(v);
        }
        if let Some(v) = file.watchlist {
            cfg.watchlist = v.into_iter().filter(|w| !w.name.trim().is_empty()).collect();
        }
        if let Some(v) = file.news_query.filter(|q| !q.trim().is_empty()) {
            cfg.news_query = v;
        }
        if let Some(v) = file.newsapi_domains {
            cfg.newsapi_domains = clean_list(v);
        }

        for k in &cfg.keywords {
            validate_pattern(k)?;
        }
        Ok(cfg)
    }

    /// Apply env overrides through `lookup` (tests pass a map instead of the process env).
    pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = parse_num::<u64>(lookup("POLL_INTERVAL_MINUTES")) {
            self.poll_interval_minutes = v.max(1);
        }
        if let Some(v) = parse_num::<usize>(lookup("ALERTS_CAPACITY")) {
            self.alerts_capacity = v.max(1);
        }
        if let Some(v) = parse_num::<usize>(lookup("SEEN_CAPACITY")) {
            self.seen_capacity = v.max(1);
        }
        if let Some(v) = parse_num::<u64>(lookup("FETCH_TIMEOUT_SECS")) {
            self.fetch_timeout_secs = v.max(1);
        }
        if let Some(v) = lookup("FEEDER_AUTOSTART") {
            self.autostart = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(k) = non_blank(lookup("NEWSAPI_KEY")) {
            self.newsapi_key = Some(k);
        }
        if let Some(k) = non_blank(lookup("BING_NEWS_KEY")) {
            self.bing_news_key = Some(k);
        }
    }

    pub fn newsapi_domains_param(&self) -> String {
        self.newsapi_domains.join(",")
    }
}

fn parse_num<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse::<T>().ok())
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// Order matters for keywords (first match wins), so no sorting here.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
