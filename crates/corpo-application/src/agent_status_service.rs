//! Worker agent status.

use corpo_core::agent_status::{AgentKind, AgentStatus};
use corpo_core::endpoints::agents;
use corpo_core::error::Result;
use corpo_core::transport::{ApiRequest, HttpTransport};
use std::sync::Arc;

#[derive(Clone)]
pub struct AgentStatusService {
    transport: Arc<dyn HttpTransport>,
}

impl AgentStatusService {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn status(&self, agent: AgentKind) -> Result<AgentStatus> {
        let response = self
            .transport
            .execute(ApiRequest::get(agents::status(agent.as_str())))
            .await?;
        Ok(response.json()?)
    }

    /// Status of every agent, in [`AgentKind::ALL`] order. One failing agent
    /// does not hide the others.
    pub async fn all(&self) -> Vec<(AgentKind, Result<AgentStatus>)> {
        let mut statuses = Vec::with_capacity(AgentKind::ALL.len());
        for agent in AgentKind::ALL {
            statuses.push((agent, self.status(agent).await));
        }
        statuses
    }
}
