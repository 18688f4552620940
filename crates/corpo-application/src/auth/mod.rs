//! Authentication state and its persistence.

mod manager;
mod token_store;

pub use manager::AuthSessionManager;
pub use token_store::TokenStore;
