use crate::AgentsAction;
use anyhow::{Result, anyhow};
use colored::Colorize;
use corpo_application::CorpoClient;
use corpo_core::agent_status::{AgentKind, AgentStatus};

pub async fn run(client: &CorpoClient, action: AgentsAction) -> Result<()> {
    let AgentsAction::Status { agent } = action;
    match agent {
        Some(name) => {
            let kind: AgentKind = name.parse().map_err(|e: String| anyhow!(e))?;
            let status = client.agents.status(kind).await?;
            print_status(kind, &status);
        }
        None => {
            for (kind, status) in client.agents.all().await {
                match status {
                    Ok(status) => print_status(kind, &status),
                    Err(err) => println!("{:<13} {} {}", kind.as_str(), "unreachable".red(), err),
                }
            }
        }
    }
    Ok(())
}

fn print_status(kind: AgentKind, status: &AgentStatus) {
    let badge = match status.status.as_str() {
        "active" | "idle" | "online" => status.status.green(),
        "busy" | "processing" => status.status.yellow(),
        _ => status.status.red(),
    };
    println!("{:<13} {} {}", kind.as_str(), badge, status.last_activity.dimmed());
}
