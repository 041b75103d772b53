use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use tracing::{info, warn};

use super::model::{FeedResponse, RawItem, SourcedItem};
use super::source::{resolve_source_name, FeedSource};
use crate::error::FetchError;

/// Result of fetching one source. Failures carry the reason, not an error,
/// so a bad source never affects its siblings.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched {
        source: FeedSource,
        source_name: String,
        items: Vec<RawItem>,
    },
    Failed {
        source: FeedSource,
        reason: String,
    },
}

impl FetchOutcome {
    pub fn source(&self) -> &FeedSource {
        match self {
            FetchOutcome::Fetched { source, .. } | FetchOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }

    /// Items tagged with their publisher; empty for a failed source.
    pub fn into_sourced_items(self) -> Vec<SourcedItem> {
        match self {
            FetchOutcome::Fetched {
                source_name, items, ..
            } => items
                .into_iter()
                .map(|item| SourcedItem {
                    source_name: source_name.clone(),
                    item,
                })
                .collect(),
            FetchOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// Client for the feed-to-JSON conversion endpoint.
pub struct Fetcher {
    client: Client,
    endpoint: String,
    api_key: String,
    item_count: u32,
}

impl Fetcher {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        item_count: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("CanopyNews/1.0 (Feed Ingest)")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            item_count,
        })
    }

    pub async fn fetch_source(&self, source: &FeedSource) -> Result<Vec<RawItem>, FetchError> {
        let count = self.item_count.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("rss_url", source.url),
                ("api_key", self.api_key.as_str()),
                ("count", count.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: FeedResponse =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))?;
        if body.status != "ok" {
            let detail = match body.message {
                Some(message) => format!("{}: {}", body.status, message),
                None => body.status,
            };
            return Err(FetchError::Upstream(detail));
        }

        Ok(body.items)
    }

    /// Fetch every source concurrently and wait for all of them to settle.
    ///
    /// Outcomes come back in the order of `sources`.
    pub async fn fetch_all(&self, sources: &[FeedSource]) -> Vec<FetchOutcome> {
        let fetches = sources.iter().map(|source| async move {
            match self.fetch_source(source).await {
                Ok(items) => {
                    let source_name = resolve_source_name(source.url);
                    info!(
                        feed = source.display_name,
                        source = %source_name,
                        count = items.len(),
                        "Fetched feed"
                    );
                    FetchOutcome::Fetched {
                        source: *source,
                        source_name,
                        items,
                    }
                }
                Err(e) => {
                    warn!(feed = source.display_name, url = source.url, "Failed to fetch feed: {}", e);
                    FetchOutcome::Failed {
                        source: *source,
                        reason: e.to_string(),
                    }
                }
            }
        });

        join_all(fetches).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GRIST: FeedSource = FeedSource::new("https://grist.org/feed/", "Grist");
    const MONGABAY: FeedSource = FeedSource::new("https://news.mongabay.com/feed/", "Mongabay");

    fn fetcher(server: &MockServer) -> Fetcher {
        Fetcher::new(
            format!("{}/v1/api.json", server.uri()),
            "test-key",
            20,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn ok_body(titles: &[&str]) -> serde_json::Value {
        let items: Vec<_> = titles
            .iter()
            .map(|t| serde_json::json!({"title": t, "pubDate": "2026-10-01 00:00:00"}))
            .collect();
        serde_json::json!({"status": "ok", "items": items})
    }

    mod fetch_source_tests {
        use super::*;

        #[tokio::test]
        async fn test_sends_feed_key_and_count() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1/api.json"))
                .and(query_param("rss_url", GRIST.url))
                .and(query_param("api_key", "test-key"))
                .and(query_param("count", "20"))
                .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["Tree"])))
                .expect(1)
                .mount(&server)
                .await;

            let items = fetcher(&server).fetch_source(&GRIST).await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].title.as_deref(), Some("Tree"));
        }

        #[tokio::test]
        async fn test_http_error_status() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let result = fetcher(&server).fetch_source(&GRIST).await;
            assert!(matches!(result, Err(FetchError::Status(500))));
        }

        #[tokio::test]
        async fn test_upstream_error_status() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_json(
                    serde_json::json!({"status": "error", "message": "Cannot download this RSS feed"}),
                ))
                .mount(&server)
                .await;

            let result = fetcher(&server).fetch_source(&GRIST).await;
            match result {
                Err(FetchError::Upstream(detail)) => {
                    assert!(detail.contains("Cannot download"))
                }
                other => panic!("expected upstream error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_malformed_body() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
                .mount(&server)
                .await;

            let result = fetcher(&server).fetch_source(&GRIST).await;
            assert!(matches!(result, Err(FetchError::Decode(_))));
        }

        #[tokio::test]
        async fn test_missing_status_field_is_a_decode_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
                )
                .mount(&server)
                .await;

            let result = fetcher(&server).fetch_source(&GRIST).await;
            assert!(matches!(result, Err(FetchError::Decode(_))));
        }

        #[tokio::test]
        async fn test_timeout_is_a_failure() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(ok_body(&["late"]))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let slow = Fetcher::new(
                format!("{}/v1/api.json", server.uri()),
                "k",
                20,
                Duration::from_millis(200),
            )
            .unwrap();
            assert!(slow.fetch_source(&GRIST).await.is_err());
        }
    }

    mod fetch_all_tests {
        use super::*;

        #[tokio::test]
        async fn test_one_failure_does_not_affect_siblings() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(query_param("rss_url", GRIST.url))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(query_param("rss_url", MONGABAY.url))
                .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["a", "b"])))
                .mount(&server)
                .await;

            let outcomes = fetcher(&server).fetch_all(&[GRIST, MONGABAY]).await;

            assert_eq!(outcomes.len(), 2);
            assert_eq!(outcomes[0].source(), &GRIST);
            assert!(outcomes[0].is_failure());
            assert!(!outcomes[1].is_failure());

            let items: Vec<_> = outcomes
                .into_iter()
                .flat_map(FetchOutcome::into_sourced_items)
                .collect();
            assert_eq!(items.len(), 2);
            assert!(items.iter().all(|i| i.source_name == "Mongabay"));
        }

        #[tokio::test]
        async fn test_all_sources_down() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;

            let outcomes = fetcher(&server).fetch_all(&[GRIST, MONGABAY]).await;
            assert!(outcomes.iter().all(FetchOutcome::is_failure));
        }

        #[tokio::test]
        async fn test_no_sources() {
            let server = MockServer::start().await;
            let outcomes = fetcher(&server).fetch_all(&[]).await;
            assert!(outcomes.is_empty());
        }
    }
}
