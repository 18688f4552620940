use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod bootstrap;
mod commands;
mod render;

#[derive(Parser)]
#[command(name = "corpo")]
#[command(about = "CORPO - chat with the corporate agent backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored credentials
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Reload the signed-in user from the backend
    Profile,
    /// Converse with the agents
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Manage knowledge base documents
    Kb {
        #[command(subcommand)]
        action: KbAction,
    },
    /// Inspect the backend's worker agents
    Agents {
        #[command(subcommand)]
        action: AgentsAction,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ChatAction {
    /// Show the active session, creating one when there is none
    Session {
        /// Start a fresh session instead
        #[arg(long)]
        new: bool,
    },
    /// Print the messages of the active session
    History,
    /// Send a message, optionally with a file attached
    Send {
        message: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Re-send a failed message
    Retry { id: String },
    /// Remove a message from the local history
    Delete { id: String },
    /// Delete the active session and its history
    Clear,
}

#[derive(Subcommand)]
pub enum KbAction {
    /// List documents
    List,
    /// Delete a document
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum AgentsAction {
    /// Status of one agent (data, report, orchestrator, uni) or all of them
    Status { agent: Option<String> },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_service = corpo_infrastructure::ConfigService::default();

    if let Commands::Config { action } = &cli.command {
        return commands::config::run(&config_service, action);
    }

    let context = bootstrap::AppContext::load(config_service)?;
    let client = &context.client;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(client, &email, password).await?,
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => commands::auth::register(client, first_name, last_name, email, password).await?,
        Commands::Logout => commands::auth::logout(client).await,
        Commands::Whoami => commands::auth::whoami(client).await,
        Commands::Profile => commands::auth::profile(client).await?,
        Commands::Chat { action } => commands::chat::run(client, action).await?,
        Commands::Kb { action } => commands::kb::run(client, action).await?,
        Commands::Agents { action } => commands::agents::run(client, action).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
