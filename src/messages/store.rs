use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::Message;
use crate::config::MessageSettings;
use crate::error::StoreError;

/// Messages for one day plus the revision they were read at.
#[derive(Debug, Clone, Default)]
pub struct StoredFile {
    pub messages: Vec<Message>,
    /// Blob sha of the file; `None` when the file does not exist yet.
    pub sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// A GitHub repository used as the message database, one JSON array per day.
///
/// Appends are read-modify-write against the contents API. Two writers that
/// read the same revision race: the second PUT is rejected by GitHub and
/// surfaces as [`StoreError::Conflict`]. Nothing is retried.
pub struct GithubStore {
    client: Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    directory: String,
    token: String,
}

impl GithubStore {
    pub fn new(client: Client, settings: &MessageSettings, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            owner: settings.owner.clone(),
            repo: settings.repo.clone(),
            branch: settings.branch.clone(),
            directory: settings.directory.trim_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn file_path(&self, date: NaiveDate) -> String {
        format!("{}/{}.json", self.directory, date.format("%Y-%m-%d"))
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "CanopyNews/1.0 (Message Board)")
    }

    pub async fn read(&self, path: &str) -> Result<StoredFile, StoreError> {
        let response = self
            .request(reqwest::Method::GET, &self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "No stored messages yet");
            return Ok(StoredFile::default());
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body: ContentsResponse = response.json().await?;
        let messages = decode_messages(&body.content)?;
        Ok(StoredFile {
            messages,
            sha: Some(body.sha),
        })
    }

    pub async fn write(
        &self,
        path: &str,
        messages: &[Message],
        sha: Option<&str>,
        commit_message: String,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(messages)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let payload = PutContents {
            message: commit_message,
            content: STANDARD.encode(json),
            branch: &self.branch,
            sha,
        };

        let response = self
            .request(reqwest::Method::PUT, &self.contents_url(path))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }

    /// Read the day's file, add `message`, write it back at the revision read.
    pub async fn append(&self, message: &Message) -> Result<(), StoreError> {
        let path = self.file_path(message.created_at.date_naive());
        let StoredFile { mut messages, sha } = self.read(&path).await?;

        messages.push(message.clone());
        let commit_message = format!("Add message from {}", message.name);
        self.write(&path, &messages, sha.as_deref(), commit_message)
            .await?;

        info!(path = %path, total = messages.len(), "Message stored");
        Ok(())
    }

    pub async fn list(&self, date: NaiveDate) -> Result<Vec<Message>, StoreError> {
        Ok(self.read(&self.file_path(date)).await?.messages)
    }
}

async fn api_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StoreError::Api { status, message }
}

/// GitHub wraps base64 content at 60 columns.
fn decode_messages(content: &str) -> Result<Vec<Message>, StoreError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FILE: &str = "/repos/greenorg/site-data/contents/messages/2026-10-19.json";

    fn store(server: &MockServer) -> GithubStore {
        let settings = MessageSettings {
            api_base: server.uri(),
            owner: "greenorg".to_string(),
            repo: "site-data".to_string(),
            ..Default::default()
        };
        GithubStore::new(Client::new(), &settings, "gh-token")
    }

    fn message(name: &str, text: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            name: name.to_string(),
            message: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap(),
        }
    }

    fn encoded(messages: &[Message]) -> String {
        let b64 = STANDARD.encode(serde_json::to_string(messages).unwrap());
        // Mimic GitHub's line wrapping
        b64.as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_file_path_is_dated() {
        let settings = MessageSettings {
            directory: "/board/".to_string(),
            ..Default::default()
        };
        let store = GithubStore::new(Client::new(), &settings, "t");
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(store.file_path(date), "board/2026-01-05.json");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_messages("%%%"), Err(StoreError::Decode(_))));
        let not_json = STANDARD.encode("not json");
        assert!(matches!(decode_messages(&not_json), Err(StoreError::Decode(_))));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FILE))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store(&server);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let file = store.read(&store.file_path(date)).await.unwrap();
        assert!(file.messages.is_empty());
        assert!(file.sha.is_none());
    }

    #[tokio::test]
    async fn test_read_existing_file() {
        let server = MockServer::start().await;
        let existing = vec![message("Ana", "Plant more oaks")];
        Mock::given(method("GET"))
            .and(path(FILE))
            .and(query_param("ref", "main"))
            .and(header("Authorization", "Bearer gh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": encoded(&existing),
                "sha": "abc123",
                "encoding": "base64"
            })))
            .mount(&server)
            .await;

        let file = store(&server)
            .read("messages/2026-10-19.json")
            .await
            .unwrap();
        assert_eq!(file.messages, existing);
        assert_eq!(file.sha.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_append_creates_new_file_without_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FILE))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(FILE))
            .and(body_partial_json(serde_json::json!({"branch": "main"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).append(&message("Ben", "Hello")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        assert!(body.get("sha").is_none());
        let stored = decode_messages(body["content"].as_str().unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Ben");
    }

    #[tokio::test]
    async fn test_append_updates_existing_file_with_sha() {
        let server = MockServer::start().await;
        let existing = vec![message("Ana", "First")];
        Mock::given(method("GET"))
            .and(path(FILE))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": encoded(&existing),
                "sha": "rev-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(FILE))
            .and(body_partial_json(serde_json::json!({"sha": "rev-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).append(&message("Ben", "Second")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        let stored = decode_messages(body["content"].as_str().unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].message, "First");
        assert_eq!(stored[1].message, "Second");
    }

    #[tokio::test]
    async fn test_concurrent_write_is_a_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let result = store(&server).append(&message("Ben", "Late")).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let result = store(&server).read("messages/2026-10-19.json").await;
        match result {
            Err(StoreError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Bad credentials"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
