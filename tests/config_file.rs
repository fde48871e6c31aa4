// tests/config_file.rs
//
// FeederConfig::load() against real files and process env. Serialised because
// both FEEDER_CONFIG_PATH and the override variables are process-global.

use std::io::Write;

use news_alert_feeder::config::FeederConfig;
use news_alert_feeder::matcher::WatchEntry;
use serial_test::serial;

const OVERRIDES: &[&str] = &[
    "FEEDER_CONFIG_PATH",
    "POLL_INTERVAL_MINUTES",
    "ALERTS_CAPACITY",
    "SEEN_CAPACITY",
    "FETCH_TIMEOUT_SECS",
    "FEEDER_AUTOSTART",
    "NEWSAPI_KEY",
    "BING_NEWS_KEY",
];

fn clear_env() {
    for k in OVERRIDES {
        std::env::remove_var(k);
    }
}

fn write_toml(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(body.as_bytes()).expect("write toml");
    f
}

#[test]
#[serial]
fn explicit_path_is_loaded_then_env_wins() {
    clear_env();
    let file = write_toml(
        r#"
poll_interval_minutes = 15
alerts_capacity = 100
feeds = ["https://a.example/rss"]
keywords = ['\bflood\b']

[[watchlist]]
name = "Wipro"
"#,
    );
    std::env::set_var("FEEDER_CONFIG_PATH", file.path());
    std::env::set_var("POLL_INTERVAL_MINUTES", "3");
    std::env::set_var("BING_NEWS_KEY", "secret");

    let cfg = FeederConfig::load().expect("load");
    clear_env();

    assert_eq!(cfg.poll_interval_minutes, 3);
    assert_eq!(cfg.alerts_capacity, 100);
    assert_eq!(cfg.feeds, vec!["https://a.example/rss".to_string()]);
    assert_eq!(cfg.keywords, vec![r"\bflood\b".to_string()]);
    assert_eq!(cfg.watchlist, vec![WatchEntry::new("Wipro", &[])]);
    assert_eq!(cfg.bing_news_key.as_deref(), Some("secret"));
    assert_eq!(cfg.newsapi_key, None);
}

#[test]
#[serial]
fn missing_explicit_path_is_an_error() {
    clear_env();
    std::env::set_var("FEEDER_CONFIG_PATH", "/definitely/not/here/feeder.toml");
    let res = FeederConfig::load();
    clear_env();
    assert!(res.is_err());
}

#[test]
#[serial]
fn invalid_keyword_in_file_is_an_error() {
    clear_env();
    let file = write_toml(r#"keywords = ["(unclosed"]"#);
    std::env::set_var("FEEDER_CONFIG_PATH", file.path());
    let res = FeederConfig::load();
    clear_env();
    let err = format!("{:#}", res.expect_err("bad regex must fail"));
    assert!(err.contains("parsing feeder config"), "{err}");
}

#[test]
#[serial]
fn no_file_means_builtin_defaults() {
    clear_env();
    std::env::set_var("ALERTS_CAPACITY", "42");
    let cfg = FeederConfig::load().expect("load");
    clear_env();

    assert_eq!(cfg.alerts_capacity, 42);
    assert_eq!(cfg.feeds, FeederConfig::default().feeds);
    assert!(!cfg.autostart);
}
