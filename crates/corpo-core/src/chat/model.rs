//! Chat domain models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The backend's active chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub message_count: u64,
}

impl ChatSession {
    /// Title shown in the UI.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "New Chat"
        } else {
            &self.title
        }
    }
}

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// Delivery status of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Failed,
}

/// A single message in the conversation.
///
/// Only user messages carry a `status`; assistant messages have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub role: MessageRole,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
}

impl Message {
    /// A locally created user message awaiting backend confirmation, with a
    /// client-generated id.
    pub fn pending_user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            content: content.into(),
            role: MessageRole::User,
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: Some(MessageStatus::Sending),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(MessageStatus::Failed)
    }
}

/// Partial update applied by `update_message`. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub content: Option<String>,
    pub status: Option<MessageStatus>,
    pub timestamp: Option<String>,
}

impl MessageUpdate {
    pub fn status(status: MessageStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    fn apply(self, message: &mut Message) {
        if let Some(content) = self.content {
            message.content = content;
        }
        if let Some(status) = self.status {
            message.status = Some(status);
        }
        if let Some(timestamp) = self.timestamp {
            message.timestamp = timestamp;
        }
    }
}

/// Messages indexed by id, iterated in insertion order.
///
/// Reconciliation after a send looks messages up by their id, so responses
/// arriving out of order never touch the wrong entry. Serialized as a plain
/// JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Message>", into = "Vec<Message>")]
pub struct MessageLog {
    order: Vec<String>,
    entries: HashMap<String, Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Appends a message. A message whose id is already present replaces the
    /// existing entry in place and keeps its position.
    ///
    /// Returns `true` when the message was appended as new.
    pub fn push(&mut self, message: Message) -> bool {
        let id = message.id.clone();
        let is_new = self.entries.insert(id.clone(), message).is_none();
        if is_new {
            self.order.push(id);
        }
        is_new
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.entries.get(id)
    }

    /// Applies an update to the message with `id`. Returns `false` when no
    /// such message exists.
    pub fn update(&mut self, id: &str, update: MessageUpdate) -> bool {
        match self.entries.get_mut(id) {
            Some(message) => {
                update.apply(message);
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, id: &str, status: MessageStatus) -> bool {
        self.update(id, MessageUpdate::status(status))
    }

    pub fn remove(&mut self, id: &str) -> Option<Message> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn last(&self) -> Option<&Message> {
        self.order.last().and_then(|id| self.entries.get(id))
    }

    /// Replaces the whole log.
    pub fn replace(&mut self, messages: Vec<Message>) {
        *self = Self::from(messages);
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.iter().cloned().collect()
    }

    fn values_mut(&mut self) -> impl Iterator<Item = &mut Message> {
        self.entries.values_mut()
    }
}

impl From<Vec<Message>> for MessageLog {
    fn from(messages: Vec<Message>) -> Self {
        let mut log = Self::new();
        for message in messages {
            log.push(message);
        }
        log
    }
}

impl From<MessageLog> for Vec<Message> {
    fn from(mut log: MessageLog) -> Self {
        log.order
            .iter()
            .filter_map(|id| log.entries.remove(id))
            .collect()
    }
}

/// The current conversation's messages and status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub current_session: Option<ChatSession>,
    #[serde(default)]
    pub messages: MessageLog,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub is_typing: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatState {
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Prepares a state read back from storage.
    ///
    /// Requests in flight when the state was written can never complete, so
    /// the transient flags are cleared and messages still `sending` are
    /// marked `failed` (which makes them retryable).
    pub fn into_restored(mut self) -> Self {
        self.is_loading = false;
        self.is_typing = false;
        for message in self.messages.values_mut() {
            if message.status == Some(MessageStatus::Sending) {
                message.status = Some(MessageStatus::Failed);
            }
        }
        self
    }
}
