pub mod agent_status;
pub mod auth;
pub mod chat;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod knowledge_base;
pub mod navigation;
pub mod response;
pub mod storage;
pub mod transport;
pub mod validation;

// Re-export common error type
pub use error::{CorpoError, Result};
