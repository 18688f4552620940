//! Backend REST paths, relative to the configured base URL.

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

pub mod auth {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const REFRESH: &str = "/auth/refresh";
    pub const PROFILE: &str = "/auth/profile";
}

pub mod chat {
    pub const SESSIONS: &str = "/chat/sessions";
    pub const MESSAGES: &str = "/chat/messages";
    pub const SEND: &str = "/chat/send";
    pub const SEND_FILE: &str = "/chat/send-file";
}

pub mod knowledge_base {
    pub const LIST: &str = "/knowledge-base";

    /// The path of one item. The id is percent-encoded as a single segment.
    pub fn item(id: &str) -> String {
        format!("{}/{}", LIST, urlencoding::encode(id))
    }
}

pub mod agents {
    pub fn status(agent: &str) -> String {
        format!("/agents/{}/status", agent)
    }
}

/// Endpoints that must be called without credentials.
pub fn is_credential_endpoint(path: &str) -> bool {
    path == auth::LOGIN || path == auth::REGISTER
}

pub fn is_refresh_endpoint(path: &str) -> bool {
    path == auth::REFRESH
}
