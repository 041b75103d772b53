use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::filter::parse_pub_date;
use super::model::{NormalizedArticle, SourcedItem};

pub const ELLIPSIS: &str = "...";

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub description_limit: usize,
    pub always_append_ellipsis: bool,
}

/// Strip markup, turn `&nbsp;` into spaces and collapse whitespace.
///
/// Unbalanced angle brackets left over after tag removal are dropped too.
pub fn clean_text(html: &str) -> String {
    let without_tags = RE_TAG.replace_all(html, "");
    let spaced = without_tags.replace(['<', '>'], "").replace("&nbsp;", " ");
    RE_WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Cut to `limit` characters and add the ellipsis.
pub fn truncate_description(text: &str, limit: usize, always_append: bool) -> String {
    let mut chars = text.char_indices();
    let cut_at = chars.nth(limit).map(|(idx, _)| idx);

    match cut_at {
        Some(idx) => format!("{}{}", &text[..idx], ELLIPSIS),
        None if always_append => format!("{}{}", text, ELLIPSIS),
        None => text.to_string(),
    }
}

/// Drop everything from the first `?` onward.
pub fn strip_query(link: &str) -> &str {
    link.split('?').next().unwrap_or(link)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the published form of an item.
///
/// Returns `None` when the item has no parseable date; the recency filter
/// has already dropped such items, so this only guards direct callers.
pub fn normalize(sourced: &SourcedItem, options: NormalizeOptions) -> Option<NormalizedArticle> {
    let item = &sourced.item;
    let pub_date: DateTime<Utc> = item.pub_date.as_deref().and_then(parse_pub_date)?;

    let body = non_empty(item.description.as_deref())
        .or_else(|| non_empty(item.content.as_deref()))
        .unwrap_or_default();
    let description = truncate_description(
        &clean_text(body),
        options.description_limit,
        options.always_append_ellipsis,
    );

    let image = non_empty(item.thumbnail.as_deref())
        .or_else(|| non_empty(item.enclosure_link()))
        .map(String::from);

    Some(NormalizedArticle {
        title: item.title.clone().unwrap_or_default(),
        description,
        link: strip_query(item.link.as_deref().unwrap_or_default()).to_string(),
        pub_date,
        image,
        source_name: sourced.source_name.clone(),
        author: item.author.clone(),
    })
}
