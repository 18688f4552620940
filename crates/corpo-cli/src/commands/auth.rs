use anyhow::{Context, Result};
use colored::Colorize;
use corpo_application::CorpoClient;
use corpo_core::auth::RegisterRequest;
use corpo_core::auth::token;
use std::io::{self, BufRead, Write};

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(client: &CorpoClient, email: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    let session = client.auth.login(email, &password).await?;
    if let Some(user) = &session.user {
        println!("{} Signed in as {}", "✓".green(), user.display_name().bold());
    }
    Ok(())
}

pub async fn register(
    client: &CorpoClient,
    first_name: String,
    last_name: String,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let password = read_password(password)?;
    let session = client
        .auth
        .register(RegisterRequest {
            first_name,
            last_name,
            email,
            password,
        })
        .await?;
    if let Some(user) = &session.user {
        println!("{} Registered and signed in as {}", "✓".green(), user.display_name().bold());
    }
    Ok(())
}

pub async fn logout(client: &CorpoClient) {
    client.auth.logout().await;
}

pub async fn whoami(client: &CorpoClient) {
    let session = client.auth.snapshot().await;
    let Some(user) = session.user.filter(|_| session.is_authenticated) else {
        println!("{}", "Not signed in".yellow());
        return;
    };

    println!("[{}] {}", user.initials().bold(), user.display_name());
    if let Some(email) = &user.email {
        println!("  email:   {}", email);
    }
    println!("  user id: {}", user.id);
    let expired = client.auth.is_token_expired().await;
    let token_state = match session.access_token.as_deref().and_then(token::expires_at) {
        Some(_) if expired => "expired, refreshed on next request".yellow(),
        Some(_) => "valid".green(),
        None => "unreadable".red(),
    };
    println!("  token:   {}", token_state);
}

pub async fn profile(client: &CorpoClient) -> Result<()> {
    let user = client.auth.load_profile().await?;
    println!("[{}] {}", user.initials().bold(), user.display_name());
    for (field, value) in &user.extra {
        println!("  {}: {}", field, value);
    }
    Ok(())
}
