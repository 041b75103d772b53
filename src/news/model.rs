use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response envelope of the feed-to-JSON endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// One upstream item. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Usually `{"link": ...}`, but upstream also sends `{}` or `[]`.
    #[serde(default)]
    pub enclosure: Option<serde_json::Value>,
    #[serde(default)]
    pub author: Option<String>,
}

impl RawItem {
    pub fn enclosure_link(&self) -> Option<&str> {
        self.enclosure
            .as_ref()
            .and_then(|e| e.get("link"))
            .and_then(|l| l.as_str())
    }
}

/// A raw item tagged with the publisher it came from.
#[derive(Debug, Clone)]
pub struct SourcedItem {
    pub source_name: String,
    pub item: RawItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedArticle {
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(with = "iso_millis")]
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub source_name: String,
    pub author: Option<String>,
}

impl NormalizedArticle {
    /// Author as shown to readers: trimmed, blank treated as absent.
    pub fn display_author(&self) -> Option<&str> {
        self.author.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(with = "iso_millis")]
    pub last_updated: DateTime<Utc>,
    pub articles: Vec<NormalizedArticle>,
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, the form browsers produce for ISO dates.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
