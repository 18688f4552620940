//! Terminal rendering of chat messages.

use colored::{ColoredString, Colorize};
use corpo_core::chat::{Message, MessageRole, MessageStatus};
use corpo_core::response::AgentResponse;

pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            println!(
                "{} {} {}",
                "you".bright_cyan().bold(),
                status_badge(message.status),
                message.id.dimmed()
            );
            println!("  {}", message.content);
        }
        MessageRole::Assistant => {
            println!("{} {}", "agent".bright_magenta().bold(), message.timestamp.dimmed());
            for line in agent_lines(&AgentResponse::parse(&message.content)) {
                println!("  {}", line);
            }
        }
    }
}

fn status_badge(status: Option<MessageStatus>) -> ColoredString {
    match status {
        Some(MessageStatus::Sending) => "sending".yellow(),
        Some(MessageStatus::Failed) => "failed".red(),
        Some(MessageStatus::Sent) | None => "sent".green(),
    }
}

/// Plain text lines for an agent reply.
pub fn agent_lines(response: &AgentResponse) -> Vec<String> {
    let mut lines = vec![response.summary()];
    if !response.is_structured() {
        return lines;
    }

    let insights = response.insights();
    if !insights.is_empty() {
        lines.push("Insights:".to_string());
        lines.extend(insights.into_iter().map(|insight| format!("  - {}", insight)));
    }
    let recommendations = response.recommendations();
    if !recommendations.is_empty() {
        lines.push("Recommendations:".to_string());
        lines.extend(recommendations.into_iter().map(|item| format!("  - {}", item)));
    }
    if response.has_html_content() {
        lines.push(format!(
            "[report] HTML document attached ({} bytes)",
            response.html_content().len()
        ));
    }
    if response.has_processed_data_content() {
        lines.push(format!(
            "[data] processed data attached as {}",
            response.processed_data_filename()
        ));
    }
    lines
}
