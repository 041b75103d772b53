use url::Url;

use crate::config::SOURCE_NAMES;

/// Label used when a feed URL cannot be parsed.
pub const FALLBACK_SOURCE_NAME: &str = "News Source";

/// A configured feed. Compiled in, immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    pub url: &'static str,
    pub display_name: &'static str,
}

impl FeedSource {
    pub const fn new(url: &'static str, display_name: &'static str) -> Self {
        Self { url, display_name }
    }
}

/// Map a feed URL to its publisher name.
///
/// The hostname is looked up in [`SOURCE_NAMES`] after stripping a leading
/// `www.`; unknown hosts come back verbatim (without the prefix).
pub fn resolve_source_name(feed_url: &str) -> String {
    let host = match Url::parse(feed_url).ok().and_then(|u| u.host_str().map(str::to_owned)) {
        Some(host) => host,
        None => return FALLBACK_SOURCE_NAME.to_string(),
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    SOURCE_NAMES
        .iter()
        .find(|(known, _)| *known == host)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| host.to_string())
}
