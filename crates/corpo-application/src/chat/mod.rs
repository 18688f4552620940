//! Conversation state and message delivery.

mod store;

pub use store::ChatSessionStore;
