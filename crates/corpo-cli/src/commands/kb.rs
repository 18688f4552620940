use crate::KbAction;
use anyhow::Result;
use colored::Colorize;
use corpo_application::CorpoClient;

pub async fn run(client: &CorpoClient, action: KbAction) -> Result<()> {
    match action {
        KbAction::List => {
            let items = client.knowledge_base.list().await?;
            if items.is_empty() {
                println!("{}", "Knowledge base is empty".dimmed());
            }
            for item in &items {
                println!("{} {}", item.id.dimmed(), item.title.bold());
                if let Some(file) = &item.filename {
                    println!("    file:    {} {}", file, item.file_type.as_deref().unwrap_or_default());
                }
                let tags = item.tag_list();
                if !tags.is_empty() {
                    println!("    tags:    {}", tags.join(", "));
                }
                if let Some(summary) = item.analysis_summary.as_deref().filter(|s| !s.is_empty()) {
                    println!("    summary: {}", summary);
                }
                println!("    created: {}", item.created_at);
            }
        }
        KbAction::Delete { id } => {
            if client.knowledge_base.delete(&id).await?.success {
                println!("{} Deleted {}", "✓".green(), id);
            } else {
                println!("{} Backend did not delete {}", "✗".red(), id);
            }
        }
    }
    Ok(())
}
