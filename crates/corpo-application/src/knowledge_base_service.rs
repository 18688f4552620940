//! Knowledge base documents.

use corpo_core::endpoints::knowledge_base as endpoints;
use corpo_core::error::Result;
use corpo_core::knowledge_base::{DeleteOutcome, KnowledgeBaseItem};
use corpo_core::transport::{ApiRequest, HttpTransport};
use std::sync::Arc;

#[derive(Clone)]
pub struct KnowledgeBaseService {
    transport: Arc<dyn HttpTransport>,
}

impl KnowledgeBaseService {
    /// `transport` should be the request pipeline; both endpoints require
    /// a signed-in user.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<KnowledgeBaseItem>> {
        let response = self
            .transport
            .execute(ApiRequest::get(endpoints::LIST))
            .await?;
        Ok(response.json()?)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let response = self
            .transport
            .execute(ApiRequest::delete(endpoints::item(id)))
            .await?;
        let outcome: DeleteOutcome = response.json()?;
        tracing::info!(id, success = outcome.success, "deleted knowledge base item");
        Ok(outcome)
    }
}
