//! Chat send requests and the backend's reply envelope.

use super::model::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FILE_UPLOAD_PREFIX: &str = "File uploaded: ";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the optional note sent with a file.
pub const FILE_NOTE_FIELD: &str = "request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub session_id: String,
    pub message: String,
}

impl SendMessageRequest {
    pub fn new(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message: message.into(),
        }
    }
}

/// A file picked by the user, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendFileMessageRequest {
    pub session_id: String,
    pub file: FileAttachment,
    pub message: Option<String>,
}

impl SendFileMessageRequest {
    /// The note, when one was given and is not blank.
    pub fn note(&self) -> Option<&str> {
        self.message.as_deref().filter(|note| !note.trim().is_empty())
    }

    /// The user-visible content of the optimistic message.
    pub fn display_content(&self) -> String {
        file_upload_content(&self.file.file_name, self.note())
    }
}

/// `"File uploaded: <name>"`, or `"File uploaded: <name> - <note>"`.
pub fn file_upload_content(file_name: &str, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{}{} - {}", FILE_UPLOAD_PREFIX, file_name, note),
        None => format!("{}{}", FILE_UPLOAD_PREFIX, file_name),
    }
}

/// JSON body of `POST /chat/send`. Only the text goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendContentBody<'a> {
    pub content: &'a str,
}

/// The assistant message as returned by the send endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    pub id: String,
    pub session_id: String,
    /// Plain text or a structured agent response.
    pub content: Value,
    pub timestamp: String,
}

impl MessageEnvelope {
    /// Builds the assistant message. Structured content is kept as its JSON
    /// text so the response interpreter can decode it later.
    pub fn into_assistant_message(self) -> Message {
        let content = match self.content {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Message {
            id: self.id,
            session_id: self.session_id,
            content,
            role: MessageRole::Assistant,
            timestamp: self.timestamp,
            status: None,
        }
    }
}

/// Response of `POST /chat/send` and `POST /chat/send-file`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendMessageResponse {
    pub message: MessageEnvelope,
    #[serde(default)]
    pub response: Value,
}
