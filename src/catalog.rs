//! Mutable feed / keyword / watchlist lists plus the matcher compiled from them.

use std::fmt;

use crate::matcher::{validate_pattern, KeywordMatcher, WatchEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyList(&'static str),
    Blank(&'static str),
    Duplicate(&'static str),
    NotFound(&'static str),
    InvalidPattern(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::EmptyList(what) => write!(f, "{} list must not be empty", what),
            CatalogError::Blank(what) => write!(f, "{} must not be blank", what),
            CatalogError::Duplicate(what) => write!(f, "{} already present", what),
            CatalogError::NotFound(what) => write!(f, "{} not found", what),
            CatalogError::InvalidPattern(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug)]
pub struct Catalog {
    feeds: Vec<String>,
    keywords: Vec<String>,
    watchlist: Vec<WatchEntry>,
    matcher: KeywordMatcher,
}

impl Catalog {
    pub fn new(
        feeds: Vec<String>,
        keywords: Vec<String>,
        watchlist: Vec<WatchEntry>,
    ) -> anyhow::Result<Self> {
        let matcher = KeywordMatcher::new(&keywords, &watchlist)?;
        Ok(Self {
            feeds,
            keywords,
            watchlist,
            matcher,
        })
    }

    pub fn matcher(&self) -> &KeywordMatcher {
        &self.matcher
    }

    /* ---- feeds ---- */

    pub fn feeds(&self) -> &[String] {
        &self.feeds
    }

    pub fn set_feeds(&mut self, feeds: Vec<String>) -> Result<(), CatalogError> {
        self.feeds = clean_list(feeds, "Feed")?;
        Ok(())
    }

    pub fn add_feed(&mut self, url: &str) -> Result<(), CatalogError> {
        let url = non_blank(url, "Feed")?;
        if self.feeds.iter().any(|f| f == url) {
            return Err(CatalogError::Duplicate("Feed"));
        }
        self.feeds.push(url.to_string());
        Ok(())
    }

    pub fn remove_feed(&mut self, url: &str) -> Result<(), CatalogError> {
        let pos = self
            .feeds
            .iter()
            .position(|f| f == url.trim())
            .ok_or(CatalogError::NotFound("Feed"))?;
        self.feeds.remove(pos);
        Ok(())
    }

    /* ---- keywords ---- */

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn set_keywords(&mut self, keywords: Vec<String>) -> Result<(), CatalogError> {
        let keywords = clean_list(keywords, "Keyword")?;
        for k in &keywords {
            check_pattern(k)?;
        }
        self.rebuild(keywords, self.watchlist.clone())
    }

    pub fn add_keyword(&mut self, pattern: &str) -> Result<(), CatalogError> {
        let pattern = non_blank(pattern, "Keyword")?;
        if self.keywords.iter().any(|k| k == pattern) {
            return Err(CatalogError::Duplicate("Keyword"));
        }
        check_pattern(pattern)?;
        let mut next = self.keywords.clone();
        next.push(pattern.to_string());
        self.rebuild(next, self.watchlist.clone())
    }

    pub fn remove_keyword(&mut self, pattern: &str) -> Result<(), CatalogError> {
        let pos = self
            .keywords
            .iter()
            .position(|k| k == pattern.trim())
            .ok_or(CatalogError::NotFound("Keyword"))?;
        let mut next = self.keywords.clone();
        next.remove(pos);
        self.rebuild(next, self.watchlist.clone())
    }

    /* ---- watchlist ---- */

    pub fn watchlist(&self) -> &[WatchEntry] {
        &self.watchlist
    }

    pub fn set_watchlist(&mut self, entries: Vec<WatchEntry>) -> Result<(), CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::EmptyList("Watchlist"));
        }
        let mut cleaned: Vec<WatchEntry> = Vec::with_capacity(entries.len());
        for e in entries {
            let e = clean_entry(e)?;
            if !cleaned.iter().any(|c| same_name(c, &e.name)) {
                cleaned.push(e);
            }
        }
        self.rebuild(self.keywords.clone(), cleaned)
    }

    pub fn add_watch(&mut self, entry: WatchEntry) -> Result<(), CatalogError> {
        let entry = clean_entry(entry)?;
        if self.watchlist.iter().any(|w| same_name(w, &entry.name)) {
            return Err(CatalogError::Duplicate("Watchlist entry"));
        }
        let mut next = self.watchlist.clone();
        next.push(entry);
        self.rebuild(self.keywords.clone(), next)
    }

    pub fn remove_watch(&mut self, name: &str) -> Result<(), CatalogError> {
        let pos = self
            .watchlist
            .iter()
            .position(|w| same_name(w, name.trim()))
            .ok_or(CatalogError::NotFound("Watchlist entry"))?;
        let mut next = self.watchlist.clone();
        next.remove(pos);
        self.rebuild(self.keywords.clone(), next)
    }

    // Swap lists only once the new matcher compiled.
    fn rebuild(
        &mut self,
        keywords: Vec<String>,
        watchlist: Vec<WatchEntry>,
    ) -> Result<(), CatalogError> {
        let matcher = KeywordMatcher::new(&keywords, &watchlist)
            .map_err(|e| CatalogError::InvalidPattern(e.to_string()))?;
        self.keywords = keywords;
        self.watchlist = watchlist;
        self.matcher = matcher;
        Ok(())
    }
}

fn non_blank<'a>(s: &'a str, what: &'static str) -> Result<&'a str, CatalogError> {
    let t = s.trim();
    if t.is_empty() {
        return Err(CatalogError::Blank(what));
    }
    Ok(t)
}

fn check_pattern(p: &str) -> Result<(), CatalogError> {
    validate_pattern(p).map_err(|e| CatalogError::InvalidPattern(e.to_string()))
}

fn same_name(entry: &WatchEntry, name: &str) -> bool {
    entry.name.to_lowercase() == name.to_lowercase()
}

/// Trim entries, reject blanks and empty lists, drop repeats keeping the first.
fn clean_list(items: Vec<String>, what: &'static str) -> Result<Vec<String>, CatalogError> {
    if items.is_empty() {
        return Err(CatalogError::EmptyList(what));
    }
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = non_blank(&it, what)?;
        if !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    Ok(out)
}

fn clean_entry(entry: WatchEntry) -> Result<WatchEntry, CatalogError> {
    let name = non_blank(&entry.name, "Watchlist name")?.to_string();
    let aliases = entry
        .aliases
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    Ok(WatchEntry { name, aliases })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            vec!["https://a.example/rss".into()],
            vec![r"\bflood\b".into()],
            vec![WatchEntry::new("Wipro", &[])],
        )
        .unwrap()
    }

    #[test]
    fn add_feed_rejects_duplicates() {
        let mut c = catalog();
        assert_eq!(
            c.add_feed("https://a.example/rss"),
            Err(CatalogError::Duplicate("Feed"))
        );
        c.add_feed(" https://b.example/rss ").unwrap();
        assert_eq!(c.feeds().len(), 2);
        assert_eq!(c.feeds()[1], "https://b.example/rss");
    }

    #[test]
    fn remove_missing_feed_is_not_found() {
        let mut c = catalog();
        assert_eq!(
            c.remove_feed("https://nope"),
            Err(CatalogError::NotFound("Feed"))
        );
        c.remove_feed("https://a.example/rss").unwrap();
        assert!(c.feeds().is_empty());
    }

    #[test]
    fn set_lists_reject_empty_and_blank() {
        let mut c = catalog();
        assert_eq!(c.set_feeds(vec![]), Err(CatalogError::EmptyList("Feed")));
        assert_eq!(
            c.set_keywords(vec!["ok".into(), "  ".into()]),
            Err(CatalogError::Blank("Keyword"))
        );
        assert_eq!(c.keywords(), &[r"\bflood\b".to_string()]);
    }

    #[test]
    fn invalid_keyword_leaves_catalog_untouched() {
        let mut c = catalog();
        assert!(matches!(
            c.add_keyword("(oops"),
            Err(CatalogError::InvalidPattern(_))
        ));
        assert_eq!(c.keywords().len(), 1);
        assert!(c.matcher().is_match("Flood alert"));
    }

    #[test]
    fn keyword_changes_rebuild_matcher() {
        let mut c = catalog();
        assert!(!c.matcher().is_match("Metro expansion"));
        c.add_keyword(r"\bmetro\b").unwrap();
        assert!(c.matcher().is_match("Metro expansion"));
        c.remove_keyword(r"\bmetro\b").unwrap();
        assert!(!c.matcher().is_match("Metro expansion"));
    }

    #[test]
    fn watchlist_crud() {
        let mut c = catalog();
        assert_eq!(
            c.add_watch(WatchEntry::new("wipro", &[])),
            Err(CatalogError::Duplicate("Watchlist entry"))
        );
        c.add_watch(WatchEntry::new("Infosys", &["INFY", " "])).unwrap();
        assert_eq!(c.watchlist()[1].aliases, vec!["INFY".to_string()]);
        assert!(c.matcher().is_match("INFY ADRs rise"));
        c.remove_watch("INFOSYS").unwrap();
        assert!(!c.matcher().is_match("INFY ADRs rise"));
        assert_eq!(
            c.remove_watch("Infosys"),
            Err(CatalogError::NotFound("Watchlist entry"))
        );
    }

    #[test]
    fn set_lists_drop_repeats_in_order() {
        let mut c = catalog();
        c.set_feeds(vec!["b".into(), "a".into(), "b".into()]).unwrap();
        assert_eq!(c.feeds(), &["b".to_string(), "a".to_string()]);

        c.set_watchlist(vec![
            WatchEntry::new("Wipro", &["WIT"]),
            WatchEntry::new("Infosys", &[]),
            WatchEntry::new("wipro", &[]),
        ])
        .unwrap();
        let names: Vec<&str> = c.watchlist().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Wipro", "Infosys"]);
        assert_eq!(c.watchlist()[0].aliases, vec!["WIT".to_string()]);
    }

    #[test]
    fn watchlist_names_fold_non_ascii_case() {
        let mut c = catalog();
        c.add_watch(WatchEntry::new("Émaar", &[])).unwrap();
        assert_eq!(
            c.add_watch(WatchEntry::new("ÉMAAR", &[])),
            Err(CatalogError::Duplicate("Watchlist entry"))
        );
        c.remove_watch("émaar").unwrap();
        assert_eq!(c.watchlist().len(), 1);
    }
}
