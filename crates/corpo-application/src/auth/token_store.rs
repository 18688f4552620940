//! Persisted credentials.

use corpo_core::auth::{AuthSession, StoredSession, TokenPair, token};
use corpo_core::storage::{KeyValueStore, PersistedBlob, SESSION_STORAGE_KEY, TOKEN_STORAGE_KEY};
use std::sync::Arc;

/// Persists the token pair and the signed-in user.
///
/// Both documents are written together and only a complete pair of them
/// restores a session. Storage failures are logged, never returned: losing
/// the persisted copy only costs a sign-in after restart.
#[derive(Clone)]
pub struct TokenStore {
    tokens: PersistedBlob<TokenPair>,
    session: PersistedBlob<StoredSession>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            tokens: PersistedBlob::new(store.clone(), TOKEN_STORAGE_KEY),
            session: PersistedBlob::new(store, SESSION_STORAGE_KEY),
        }
    }

    /// Rebuilds the session from storage.
    ///
    /// Anything short of two decodable documents yields the anonymous
    /// session, and the unusable leftovers are cleared. Token expiry is not
    /// checked here.
    pub fn restore(&self) -> AuthSession {
        let tokens = self.tokens.load();
        let session = self.session.load();
        match (tokens, session) {
            (Ok(Some(tokens)), Ok(Some(stored))) => {
                tracing::debug!(user_id = %stored.user.id, "restored auth session");
                AuthSession::authenticated(stored.user, tokens)
            }
            (Ok(None), Ok(None)) => AuthSession::anonymous(),
            (tokens, session) => {
                if let Err(err) = &tokens {
                    tracing::warn!(key = TOKEN_STORAGE_KEY, error = %err, "discarding stored tokens");
                }
                if let Err(err) = &session {
                    tracing::warn!(key = SESSION_STORAGE_KEY, error = %err, "discarding stored session");
                }
                self.clear();
                AuthSession::anonymous()
            }
        }
    }

    /// Writes both documents of an authenticated session.
    pub fn save(&self, session: &AuthSession) {
        let (Some(tokens), Some(user)) = (session.tokens(), session.user.clone()) else {
            tracing::warn!("refusing to persist an incomplete auth session");
            return;
        };
        self.save_tokens(&tokens);
        if let Err(err) = self.session.save(&StoredSession { user }) {
            tracing::warn!(key = SESSION_STORAGE_KEY, error = %err, "failed to persist session");
        }
    }

    pub fn save_tokens(&self, tokens: &TokenPair) {
        if let Err(err) = self.tokens.save(tokens) {
            tracing::warn!(key = TOKEN_STORAGE_KEY, error = %err, "failed to persist tokens");
        }
    }

    pub fn clear(&self) {
        for (key, result) in [
            (TOKEN_STORAGE_KEY, self.tokens.clear()),
            (SESSION_STORAGE_KEY, self.session.clear()),
        ] {
            if let Err(err) = result {
                tracing::warn!(key, error = %err, "failed to clear stored credentials");
            }
        }
    }

    /// Fail-closed expiry check of an access token.
    pub fn is_expired(access_token: Option<&str>) -> bool {
        token::is_expired(access_token)
    }
}
