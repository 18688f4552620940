//! Wiring of the client's containers.

use crate::agent_status_service::AgentStatusService;
use crate::auth::AuthSessionManager;
use crate::chat::ChatSessionStore;
use crate::knowledge_base_service::KnowledgeBaseService;
use crate::pipeline::RequestPipeline;
use corpo_core::navigation::Navigator;
use corpo_core::storage::KeyValueStore;
use corpo_core::transport::HttpTransport;
use std::sync::Arc;

/// Every container of one client process, built once and shared.
///
/// The auth manager gets the raw transport; everything else goes through
/// the request pipeline.
#[derive(Clone)]
pub struct CorpoClient {
    pub auth: Arc<AuthSessionManager>,
    pub pipeline: Arc<RequestPipeline>,
    pub chat: Arc<ChatSessionStore>,
    pub knowledge_base: KnowledgeBaseService,
    pub agents: AgentStatusService,
}

impl CorpoClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = Arc::new(AuthSessionManager::new(
            transport.clone(),
            store.clone(),
            navigator,
        ));
        let pipeline = Arc::new(RequestPipeline::new(auth.clone(), transport));
        let authed: Arc<dyn HttpTransport> = pipeline.clone();

        Self {
            chat: Arc::new(ChatSessionStore::new(authed.clone(), store)),
            knowledge_base: KnowledgeBaseService::new(authed.clone()),
            agents: AgentStatusService::new(authed),
            auth,
            pipeline,
        }
    }
}
