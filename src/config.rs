use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::news::source::FeedSource;

/// Environment variable holding the rss2json API key.
pub const API_KEY_ENV: &str = "RSS2JSON_API_KEY";
/// Environment variable holding the GitHub token used by the message store.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

pub const FEED_SOURCES: &[FeedSource] = &[
    FeedSource::new("https://news.mongabay.com/feed/", "Mongabay"),
    FeedSource::new(
        "https://www.theguardian.com/environment/forests/rss",
        "Guardian Forests",
    ),
    FeedSource::new("https://e360.yale.edu/feed.xml", "Yale E360"),
    FeedSource::new("https://grist.org/feed/", "Grist"),
    FeedSource::new(
        "https://www.sciencedaily.com/rss/earth_climate/trees.xml",
        "ScienceDaily Trees",
    ),
    FeedSource::new("https://insideclimatenews.org/feed/", "Inside Climate News"),
];

/// Matched case-insensitively as substrings of title + description.
pub const KEYWORDS: &[&str] = &[
    "tree",
    "forest",
    "reforestation",
    "deforestation",
    "afforestation",
    "woodland",
    "rainforest",
    "mangrove",
    "canopy",
    "timber",
    "logging",
    "arborist",
    "agroforestry",
];

/// Hostname (without `www.`) to publisher name.
pub const SOURCE_NAMES: &[(&str, &str)] = &[
    ("news.mongabay.com", "Mongabay"),
    ("theguardian.com", "The Guardian"),
    ("e360.yale.edu", "Yale Environment 360"),
    ("grist.org", "Grist"),
    ("sciencedaily.com", "ScienceDaily"),
    ("insideclimatenews.org", "Inside Climate News"),
    ("bbc.co.uk", "BBC News"),
    ("nature.com", "Nature"),
];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub messages: MessageSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestSettings {
    pub output_path: PathBuf,
    pub api_endpoint: String,
    /// Items requested per feed
    pub item_count: u32,
    pub recency_months: u32,
    pub max_articles: usize,
    /// Description length in characters before the ellipsis
    pub description_limit: usize,
    /// Append the ellipsis even when nothing was cut
    pub always_append_ellipsis: bool,
    pub request_timeout_secs: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("data/news.json"),
            api_endpoint: "https://api.rss2json.com/v1/api.json".to_string(),
            item_count: 20,
            recency_months: 3,
            max_articles: 12,
            description_limit: 150,
            always_append_ellipsis: true,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Articles per rendered page
    pub page_size: usize,
    /// Browser refresh interval in seconds
    pub refresh_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            page_size: 6,
            refresh_interval_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MessageSettings {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Repository directory holding one JSON file per day
    pub directory: String,
    pub word_list_url: Option<String>,
    pub max_name_len: usize,
    pub max_message_len: usize,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            directory: "messages".to_string(),
            word_list_url: None,
            max_name_len: 50,
            max_message_len: 500,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse settings from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }
}

/// Read a required secret from the process environment.
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}
