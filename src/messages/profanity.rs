use std::collections::BTreeSet;

use regex::Regex;
use reqwest::Client;
use tracing::{info, warn};

/// Words blocked even when no remote list is configured.
pub const DEFAULT_WORDS: &[&str] = &[
    "arsehole", "asshole", "bastard", "bitch", "bollocks", "crap", "damn", "fuck", "shit",
    "wanker",
];

/// Whole-word, case-insensitive word filter.
///
/// Built once before the server starts and shared read-only afterwards;
/// there is no way to use it before its word list is in place.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: BTreeSet<String>,
    pattern: Option<Regex>,
}

impl ProfanityFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        // Longest first so overlapping entries prefer the fuller word
        let mut alternatives: Vec<&String> = words.iter().collect();
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let joined = alternatives
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{})\b", joined)).ok()
        };

        Self { words, pattern }
    }

    /// Build a filter from `base` plus the newline-separated list at `url`.
    ///
    /// A failed download is logged and the filter falls back to `base`.
    pub async fn load(client: &Client, url: &str, base: &[&str]) -> Self {
        let remote = match fetch_word_list(client, url).await {
            Ok(words) => {
                info!(count = words.len(), "Loaded word list from {}", url);
                words
            }
            Err(e) => {
                warn!("Failed to load word list from {}: {}", url, e);
                Vec::new()
            }
        };

        Self::new(base.iter().map(|w| w.to_string()).chain(remote))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_profane(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Replace every blocked word with asterisks of the same length.
    pub fn clean(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern
                .replace_all(text, |caps: &regex::Captures| "*".repeat(caps[0].chars().count()))
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// One word per line; blank lines and `#` comments are skipped.
pub fn parse_word_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

async fn fetch_word_list(client: &Client, url: &str) -> Result<Vec<String>, reqwest::Error> {
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    Ok(parse_word_list(&body))
}
