use super::token_store::TokenStore;
use corpo_core::auth::{
    AuthResponse, AuthSession, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest,
    TokenPair, User,
};
use corpo_core::endpoints::auth as endpoints;
use corpo_core::error::{CorpoError, Result};
use corpo_core::navigation::{Navigator, Route};
use corpo_core::storage::KeyValueStore;
use corpo_core::transport::{ApiRequest, HttpTransport};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Owns the authentication state of the client.
///
/// `AuthSessionManager` is responsible for:
/// - Restoring the persisted session on construction
/// - Login and registration
/// - Token refresh, used by the request pipeline after a 401
/// - Logout, which also navigates to the login view
///
/// The manager talks to the backend through the raw transport, never through
/// the request pipeline, so a refresh can not recurse into itself. At most one
/// refresh call is in flight at a time.
pub struct AuthSessionManager {
    state: RwLock<AuthSession>,
    refresh_lock: Mutex<()>,
    token_store: TokenStore,
    transport: Arc<dyn HttpTransport>,
    navigator: Arc<dyn Navigator>,
}

impl AuthSessionManager {
    /// Creates a manager, restoring the session persisted in `store`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Unintercepted transport to the backend
    /// * `store` - Key/value storage holding the persisted credentials
    /// * `navigator` - Receives the login route on logout
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let token_store = TokenStore::new(store);
        let session = token_store.restore();
        Self {
            state: RwLock::new(session),
            refresh_lock: Mutex::new(()),
            token_store,
            transport,
            navigator,
        }
    }

    /// A copy of the current session.
    pub async fn snapshot(&self) -> AuthSession {
        self.state.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Signs in with email and password.
    ///
    /// Validation failures are returned before any state change or request.
    ///
    /// # Errors
    ///
    /// Returns the validation or transport error. On a transport error the
    /// session's `error` holds the server's message, or "Login failed".
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let request = LoginRequest::new(email, password);
        request.validate()?;
        let request = ApiRequest::post(endpoints::LOGIN).json(&request)?;
        self.authenticate(request, LOGIN_FAILED).await
    }

    /// Creates an account and signs in with it.
    pub async fn register(&self, user_data: RegisterRequest) -> Result<AuthSession> {
        user_data.validate()?;
        let request = ApiRequest::post(endpoints::REGISTER).json(&user_data)?;
        self.authenticate(request, REGISTRATION_FAILED).await
    }

    async fn authenticate(&self, request: ApiRequest, default_error: &str) -> Result<AuthSession> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let result = self
            .transport
            .execute(request)
            .await
            .and_then(|response| response.json::<AuthResponse>());

        match result {
            Ok(response) => {
                let session = AuthSession::authenticated(
                    response.user,
                    TokenPair {
                        access_token: response.access_token,
                        refresh_token: response.refresh_token,
                    },
                );
                self.token_store.save(&session);
                tracing::info!(
                    user_id = session.user.as_ref().map(|user| user.id.as_str()),
                    "signed in"
                );
                *self.state.write().await = session.clone();
                Ok(session)
            }
            Err(err) => {
                let message = err.server_message().unwrap_or(default_error).to_string();
                tracing::warn!(error = %err, "authentication failed");
                let mut state = self.state.write().await;
                state.is_loading = false;
                state.error = Some(message);
                Err(err.into())
            }
        }
    }

    /// Forgets the session and its persisted copy, then navigates to login.
    pub async fn logout(&self) {
        {
            let mut state = self.state.write().await;
            self.token_store.clear();
            *state = AuthSession::anonymous();
        }
        tracing::info!("signed out");
        self.navigator.navigate(Route::Login);
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// # Returns
    ///
    /// The new access token.
    ///
    /// # Errors
    ///
    /// - `CorpoError::NoRefreshToken` when none is held; the session is kept
    /// - The transport error when the refresh call fails; the session is
    ///   logged out first
    /// - `CorpoError::NoRefreshToken` when the session was signed out or
    ///   replaced while the call was in flight; its answer is discarded
    pub async fn refresh_token(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_exclusive().await
    }

    /// Refreshes after the backend rejected `rejected`, the access token a
    /// request carried.
    ///
    /// When a concurrent refresh already replaced that token, the current
    /// token is returned and no second refresh call is made.
    pub async fn refresh_rejected(&self, rejected: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        match self.valid_access_token().await {
            Some(current) if rejected != Some(current.as_str()) => {
                tracing::debug!("access token already refreshed");
                return Ok(current);
            }
            _ => {}
        }
        self.refresh_exclusive().await
    }

    /// Caller holds `refresh_lock`.
    async fn refresh_exclusive(&self) -> Result<String> {
        let Some(refresh_token) = self.state.read().await.refresh_token.clone() else {
            return Err(CorpoError::NoRefreshToken);
        };

        let request = ApiRequest::post(endpoints::REFRESH).json(&RefreshRequest {
            refresh_token: refresh_token.clone(),
        })?;
        let result = self
            .transport
            .execute(request)
            .await
            .and_then(|response| response.json::<RefreshResponse>());

        match result {
            Ok(response) => {
                let mut state = self.state.write().await;
                if !state.holds_refresh_token(&refresh_token) {
                    tracing::debug!("session changed during refresh, discarding tokens");
                    return Err(CorpoError::NoRefreshToken);
                }
                let tokens = TokenPair {
                    access_token: response.access_token,
                    refresh_token: response.refresh_token.or(Some(refresh_token)),
                };
                state.access_token = Some(tokens.access_token.clone());
                state.refresh_token = tokens.refresh_token.clone();
                self.token_store.save_tokens(&tokens);
                tracing::debug!("access token refreshed");
                Ok(tokens.access_token)
            }
            Err(err) => {
                if self.state.read().await.holds_refresh_token(&refresh_token) {
                    tracing::warn!(error = %err, "token refresh failed, signing out");
                    self.logout().await;
                }
                Err(err.into())
            }
        }
    }

    /// Whether the current access token must be treated as expired.
    pub async fn is_token_expired(&self) -> bool {
        TokenStore::is_expired(self.state.read().await.access_token.as_deref())
    }

    pub async fn get_access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    /// The access token, unless it is expired.
    pub async fn valid_access_token(&self) -> Option<String> {
        self.get_access_token()
            .await
            .filter(|token| !TokenStore::is_expired(Some(token)))
    }

    /// Reloads the signed-in user from the backend.
    ///
    /// A 401 signs out; any other failure leaves the session untouched.
    pub async fn load_profile(&self) -> Result<User> {
        let mut request = ApiRequest::get(endpoints::PROFILE);
        if let Some(token) = self.get_access_token().await {
            request = request.with_bearer(&token);
        }

        let result = self
            .transport
            .execute(request)
            .await
            .and_then(|response| response.json::<User>());

        match result {
            Ok(user) => {
                let session = {
                    let mut state = self.state.write().await;
                    state.user = Some(user.clone());
                    state.clone()
                };
                if session.is_authenticated {
                    self.token_store.save(&session);
                }
                Ok(user)
            }
            Err(err) if err.is_unauthorized() => {
                tracing::warn!("profile request unauthorized, signing out");
                self.logout().await;
                Err(err.into())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load profile");
                Err(err.into())
            }
        }
    }
}
