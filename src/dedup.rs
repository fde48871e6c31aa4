//! Seen-id bookkeeping for de-duplication across polls.

use std::collections::{HashSet, VecDeque};

/// Maximum length (in chars) of a stable id.
pub const MAX_ID_CHARS: usize = 256;

/// Build the de-dup key for an entry: title + link, trimmed, lowercased,
/// all whitespace removed, capped at [`MAX_ID_CHARS`].
pub fn stable_id(title: &str, link: &str) -> String {
    let base = format!("{}{}", title, link);
    base.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(MAX_ID_CHARS)
        .collect()
}

/// Insertion-ordered set of seen ids with FIFO eviction once `cap` is reached.
#[derive(Debug)]
pub struct SeenIds {
    order: VecDeque<String>,
    set: HashSet<String>,
    cap: usize,
}

impl SeenIds {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            order: VecDeque::with_capacity(cap.min(10_000)),
            set: HashSet::with_capacity(cap.min(10_000)),
            cap,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: String) -> bool {
        if !self.set.insert(id.clone()) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.set.remove(&old);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Most recently seen first.
    pub fn sample(&self, limit: usize) -> Vec<String> {
        self.order.iter().rev().take(limit).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.set.clear();
    }
}
