//! Request logging layer.

use async_trait::async_trait;
use corpo_core::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use std::sync::Arc;
use std::time::Instant;

/// Logs method, path, outcome and elapsed time of every call made through
/// the wrapped transport. Headers and bodies are never logged.
pub struct LoggingTransport {
    inner: Arc<dyn HttpTransport>,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn HttpTransport>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpTransport for LoggingTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = request.method;
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");

        let started = Instant::now();
        let result = self.inner.execute(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                tracing::info!(%method, %path, status = response.status, elapsed_ms, "request completed");
            }
            Err(err) => {
                tracing::warn!(%method, %path, status = ?err.status_code(), elapsed_ms, error = %err, "request failed");
            }
        }
        result
    }
}
