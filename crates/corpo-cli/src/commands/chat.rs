use crate::ChatAction;
use crate::render;
use anyhow::{Context, Result};
use colored::Colorize;
use corpo_application::CorpoClient;
use corpo_core::chat::{ChatSession, FileAttachment, SendFileMessageRequest, SendMessageRequest};
use std::path::Path;

pub async fn run(client: &CorpoClient, action: ChatAction) -> Result<()> {
    match action {
        ChatAction::Session { new } => {
            let session = if new {
                client.chat.create_chat_session().await?
            } else {
                client.chat.ensure_session().await?
            };
            print_session(&session);
        }
        ChatAction::History => {
            let session = active_session(client).await?;
            let messages = client.chat.get_chat_messages(&session.id).await?;
            print_session(&session);
            if messages.is_empty() {
                println!("{}", "No messages yet".dimmed());
            }
            for message in &messages {
                render::print_message(message);
            }
        }
        ChatAction::Send { message, file } => {
            let session = active_session(client).await?;
            let reply = match file {
                Some(path) => {
                    let file = read_attachment(&path)?;
                    client
                        .chat
                        .send_file_message(SendFileMessageRequest {
                            session_id: session.id,
                            file,
                            message,
                        })
                        .await?
                }
                None => {
                    let message = message.context("Nothing to send: give a message or --file")?;
                    client
                        .chat
                        .send_message(SendMessageRequest::new(session.id, message))
                        .await?
                }
            };
            render::print_message(&reply);
        }
        ChatAction::Retry { id } => match client.chat.retry_message(&id).await? {
            Some(reply) => render::print_message(&reply),
            None => println!("{}", "Nothing to retry: message is not a failed user message".yellow()),
        },
        ChatAction::Delete { id } => {
            client.chat.delete_message(&id).await?;
            println!("{} Removed message {}", "✓".green(), id);
        }
        ChatAction::Clear => {
            client.chat.clear_session().await?;
            println!("{} Chat session cleared", "✓".green());
        }
    }
    Ok(())
}

/// The session held locally, else the backend's active one (or a new one).
async fn active_session(client: &CorpoClient) -> Result<ChatSession> {
    if let Some(session) = client.chat.current_session().await {
        return Ok(session);
    }
    Ok(client.chat.ensure_session().await?)
}

fn read_attachment(path: &Path) -> Result<FileAttachment> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(FileAttachment::new(file_name, bytes))
}

fn print_session(session: &ChatSession) {
    println!(
        "{} {} {}",
        session.display_title().bold(),
        format!("({})", session.id).dimmed(),
        format!("{} messages", session.message_count).dimmed()
    );
}
