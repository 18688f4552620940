//! Chat domain module.
//!
//! This module contains the conversation state owned by the chat session
//! store and the request/response types of the chat endpoints.
//!
//! # Module Structure
//!
//! - `model`: `ChatSession`, `Message`, `MessageLog`, `ChatState`
//! - `request`: send requests, file attachments and the reply envelope

mod model;
mod request;

// Re-export public API
pub use model::{
    ChatSession, ChatState, Message, MessageLog, MessageRole, MessageStatus, MessageUpdate,
};
pub use request::{
    FILE_FIELD, FILE_NOTE_FIELD, FILE_UPLOAD_PREFIX, FileAttachment, MessageEnvelope,
    SendContentBody, SendFileMessageRequest, SendMessageRequest, SendMessageResponse,
    file_upload_content,
};
