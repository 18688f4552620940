//! Application layer of the Corpo client.
//!
//! Owns the two state containers (authentication and chat), the request
//! pipeline between them and the backend, and the thin read-only services.

pub mod agent_status_service;
pub mod auth;
pub mod chat;
pub mod client;
pub mod knowledge_base_service;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent_status_service::AgentStatusService;
pub use auth::{AuthSessionManager, TokenStore};
pub use chat::ChatSessionStore;
pub use client::CorpoClient;
pub use knowledge_base_service::KnowledgeBaseService;
pub use pipeline::RequestPipeline;
