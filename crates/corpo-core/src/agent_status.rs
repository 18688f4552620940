//! Status of the backend's worker agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The agents the backend exposes a status endpoint for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Data,
    Report,
    Orchestrator,
    Uni,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Data,
        AgentKind::Report,
        AgentKind::Orchestrator,
        AgentKind::Uni,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Data => "data",
            AgentKind::Report => "report",
            AgentKind::Orchestrator => "orchestrator",
            AgentKind::Uni => "uni",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown agent '{}' (expected data, report, orchestrator or uni)", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub status: String,
    #[serde(default)]
    pub last_activity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_kind() {
        assert_eq!("Report".parse::<AgentKind>(), Ok(AgentKind::Report));
        assert!("billing".parse::<AgentKind>().is_err());
    }
}
