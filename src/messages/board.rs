use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use super::model::{Message, Submission};
use super::profanity::ProfanityFilter;
use super::store::GithubStore;
use crate::config::MessageSettings;
use crate::error::{StoreError, SubmitError};

/// Moderated message board: validates, cleans and stores submissions.
pub struct MessageBoard {
    filter: ProfanityFilter,
    store: GithubStore,
    max_name_len: usize,
    max_message_len: usize,
}

impl MessageBoard {
    pub fn new(filter: ProfanityFilter, store: GithubStore, settings: &MessageSettings) -> Self {
        Self {
            filter,
            store,
            max_name_len: settings.max_name_len,
            max_message_len: settings.max_message_len,
        }
    }

    /// Trimmed name and message, or the reason the submission is rejected.
    pub fn validate(&self, submission: &Submission) -> Result<(String, String), SubmitError> {
        let name = submission.name.trim();
        let message = submission.message.trim();

        if name.is_empty() {
            return Err(SubmitError::Invalid("Name is required".to_string()));
        }
        if message.is_empty() {
            return Err(SubmitError::Invalid("Message is required".to_string()));
        }
        if name.chars().count() > self.max_name_len {
            return Err(SubmitError::Invalid(format!(
                "Name must be at most {} characters",
                self.max_name_len
            )));
        }
        if message.chars().count() > self.max_message_len {
            return Err(SubmitError::Invalid(format!(
                "Message must be at most {} characters",
                self.max_message_len
            )));
        }

        Ok((name.to_string(), message.to_string()))
    }

    pub async fn submit(
        &self,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<Message, SubmitError> {
        let (name, message) = self.validate(submission)?;

        if self.filter.is_profane(&name) || self.filter.is_profane(&message) {
            info!("Masking blocked words in submission");
        }

        let message = Message {
            id: Uuid::new_v4(),
            name: self.filter.clean(&name),
            message: self.filter.clean(&message),
            created_at: now,
        };
        self.store.append(&message).await?;
        Ok(message)
    }

    /// Messages posted on `date`, newest first.
    pub async fn messages_for(&self, date: NaiveDate) -> Result<Vec<Message>, StoreError> {
        let mut messages = self.store.list(date).await?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }
}
