//! Credential attachment and refresh-on-401 for backend requests.

use crate::auth::AuthSessionManager;
use async_trait::async_trait;
use corpo_core::endpoints::{is_credential_endpoint, is_refresh_endpoint};
use corpo_core::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use std::sync::Arc;

/// Wraps the backend transport for every authenticated caller.
///
/// 1. Login and registration requests pass through untouched.
/// 2. A non-expired access token is attached as a bearer credential.
/// 3. A 401 from anything but the refresh endpoint triggers one refresh and
///    one retry. When the refresh fails, the original 401 is returned.
///    Concurrent 401s share a single refresh.
///
/// Network failures and other statuses are never retried.
pub struct RequestPipeline {
    auth: Arc<AuthSessionManager>,
    next: Arc<dyn HttpTransport>,
}

impl RequestPipeline {
    pub fn new(auth: Arc<AuthSessionManager>, next: Arc<dyn HttpTransport>) -> Self {
        Self { auth, next }
    }

    pub async fn intercept(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if is_credential_endpoint(&request.path) {
            return self.next.execute(request).await;
        }

        let attached = self.auth.valid_access_token().await;
        let retry = request.clone();
        let request = match &attached {
            Some(token) => request.with_bearer(token),
            None => request,
        };

        match self.next.execute(request).await {
            Err(err) if err.is_unauthorized() && !is_refresh_endpoint(&retry.path) => {
                tracing::debug!(path = %retry.path, "unauthorized, attempting token refresh");
                match self.auth.refresh_rejected(attached.as_deref()).await {
                    Ok(token) => self.next.execute(retry.with_bearer(&token)).await,
                    Err(refresh_err) => {
                        tracing::warn!(path = %retry.path, error = %refresh_err, "token refresh failed");
                        Err(err)
                    }
                }
            }
            other => other,
        }
    }
}

#[async_trait]
impl HttpTransport for RequestPipeline {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.intercept(request).await
    }
}
