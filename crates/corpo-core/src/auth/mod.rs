//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: users, auth session state and auth wire types
//! - `token`: access token payload decoding and expiry checks
//!
//! # Usage
//!
//! ```ignore
//! use corpo_core::auth::{AuthSession, LoginRequest, User};
//! use corpo_core::auth::token;
//! ```

mod model;
pub mod token;

// Re-export public API
pub use model::{
    AuthResponse, AuthSession, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest,
    StoredSession, TokenPair, User,
};
