// src/matcher.rs
//! Keyword and watchlist matching.
//!
//! Keywords are user-supplied regex patterns, compiled case-insensitively.
//! Watchlist entries are entity names plus aliases; each entry compiles into a
//! single alternation of escaped literals with word boundaries. Keywords are
//! tried first (in list order), then the watchlist; the first hit wins.

use anyhow::{anyhow, bail, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// A named entity to watch for, e.g. a company and its ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl WatchEntry {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Name followed by aliases, trimmed, blanks skipped.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Keyword,
    Watchlist,
}

/// The rule that fired: the keyword pattern, or the watchlist entity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHit {
    pub kind: MatchKind,
    pub label: String,
}

#[derive(Debug)]
struct CompiledRule {
    kind: MatchKind,
    label: String,
    re: Regex,
}

#[derive(Debug, Default)]
pub struct KeywordMatcher {
    rules: Vec<CompiledRule>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String], watchlist: &[WatchEntry]) -> Result<Self> {
        let mut rules = Vec::with_capacity(keywords.len() + watchlist.len());
        for k in keywords {
            rules.push(CompiledRule {
                kind: MatchKind::Keyword,
                label: k.clone(),
                re: compile_pattern(k)?,
            });
        }
        for w in watchlist {
            rules.push(CompiledRule {
                kind: MatchKind::Watchlist,
                label: w.name.trim().to_string(),
                re: compile_watch_entry(w)?,
            });
        }
        Ok(Self { rules })
    }

    /// First matching rule, or `None` for empty text.
    pub fn find(&self, text: &str) -> Option<MatchHit> {
        if text.trim().is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|r| r.re.is_match(text))
            .map(|r| MatchHit {
                kind: r.kind,
                label: r.label.clone(),
            })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

/// Compile a keyword pattern the way the matcher uses it.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| anyhow!("keyword `{}` regex error: {}", pattern, e))
}

pub fn validate_pattern(pattern: &str) -> Result<()> {
    compile_pattern(pattern).map(|_| ())
}

fn compile_watch_entry(entry: &WatchEntry) -> Result<Regex> {
    let alts: Vec<String> = entry.terms().map(bounded_literal).collect();
    if alts.is_empty() {
        bail!("watchlist entry has no usable name or alias");
    }
    let pattern = format!("(?:{})", alts.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| anyhow!("watchlist `{}` regex error: {}", entry.name, e))
}

// `\b` only next to word characters, so terms like "C++" or "@handle" still match.
fn bounded_literal(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = term.chars().next().is_some_and(is_word);
    let tail = term.chars().last().is_some_and(is_word);
    format!(
        "{}{}{}",
        if lead { r"\b" } else { "" },
        regex::escape(term),
        if tail { r"\b" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let m = KeywordMatcher::new(&kw(&[r"\bBengaluru\b"]), &[]).unwrap();
        assert!(m.is_match("Rains lash BENGALURU again"));
        assert!(!m.is_match("Mumbai rains"));
    }

    #[test]
    fn word_boundaries_respected() {
        let m = KeywordMatcher::new(&kw(&[r"\bAI\b"]), &[]).unwrap();
        assert!(m.is_match("New AI policy announced"));
        assert!(!m.is_match("Maintenance of the airport"));
    }

    #[test]
    fn keywords_win_over_watchlist() {
        let m = KeywordMatcher::new(
            &kw(&[r"\bIPO\b"]),
            &[WatchEntry::new("Infosys", &["INFY"])],
        )
        .unwrap();
        let hit = m.find("Infosys unit files for IPO").unwrap();
        assert_eq!(hit.kind, MatchKind::Keyword);
        assert_eq!(hit.label, r"\bIPO\b");
    }

    #[test]
    fn first_keyword_in_order_wins() {
        let m = KeywordMatcher::new(&kw(&["merger", "acquisition"]), &[]).unwrap();
        let hit = m.find("Acquisition and merger talks").unwrap();
        assert_eq!(hit.label, "merger");
    }

    #[test]
    fn watchlist_aliases_match_and_report_entity_name() {
        let m = KeywordMatcher::new(
            &[],
            &[WatchEntry::new("Tata Consultancy Services", &["TCS"])],
        )
        .unwrap();
        let hit = m.find("tcs shares climb").unwrap();
        assert_eq!(hit.kind, MatchKind::Watchlist);
        assert_eq!(hit.label, "Tata Consultancy Services");
        assert!(!m.is_match("TCSX index"));
    }

    #[test]
    fn watchlist_terms_are_literal() {
        let m = KeywordMatcher::new(&[], &[WatchEntry::new("C++", &["a.b"])]).unwrap();
        assert!(m.is_match("why C++ still matters"));
        assert!(!m.is_match("axb corp"));
    }

    #[test]
    fn empty_text_never_matches() {
        let m = KeywordMatcher::new(&kw(&[".*"]), &[]).unwrap();
        assert!(m.find("   ").is_none());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(validate_pattern("(unclosed").is_err());
        assert!(KeywordMatcher::new(&kw(&["ok", "[bad"]), &[]).is_err());
    }

    #[test]
    fn blank_watch_entry_is_rejected() {
        let e = WatchEntry::new("  ", &[""]);
        assert!(KeywordMatcher::new(&[], &[e]).is_err());
    }

    #[test]
    fn kannada_keywords_match() {
        let m = KeywordMatcher::new(&kw(&[r"\bಬೆಂಗಳೂರು\b"]), &[]).unwrap();
        assert!(m.is_match("ಬೆಂಗಳೂರು ನಗರದಲ್ಲಿ ಮಳೆ"));
    }
}
