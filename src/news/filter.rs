use chrono::{DateTime, Months, NaiveDateTime, Utc};

use super::model::RawItem;

/// Parse an upstream publication date.
///
/// rss2json emits `YYYY-MM-DD HH:MM:SS` in UTC; RFC 3339 and RFC 2822 are
/// accepted for feeds that pass their own format through.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Recency and keyword predicates, evaluated against a fixed run time.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    cutoff: DateTime<Utc>,
}

impl RelevanceFilter {
    pub fn new(keywords: &[&str], recency_months: u32, now: DateTime<Utc>) -> Self {
        let cutoff = now
            .checked_sub_months(Months::new(recency_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            cutoff,
        }
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Unparseable or missing dates fail.
    pub fn is_recent(&self, item: &RawItem) -> bool {
        item.pub_date
            .as_deref()
            .and_then(parse_pub_date)
            .is_some_and(|published| published >= self.cutoff)
    }

    pub fn is_relevant(&self, item: &RawItem) -> bool {
        let haystack = format!(
            "{} {}",
            item.title.as_deref().unwrap_or_default(),
            item.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    pub fn accepts(&self, item: &RawItem) -> bool {
        self.is_recent(item) && self.is_relevant(item)
    }
}
