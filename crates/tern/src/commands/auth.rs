//! Credential management subcommands.

use crate::style;
use clap::Subcommand;
use tern_auth::{oauth::PkceFlow, CredentialStore, API_KEY_ENV};

#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Run the interactive OAuth login flow.
    Login,
    /// Remove stored credentials.
    Logout,
    /// Show which credential would be used.
    Status,
}

/// Run an auth subcommand.
pub async fn run(action: AuthAction) -> anyhow::Result<()> {
    let store = CredentialStore::new()?;

    match action {
        AuthAction::Login => {
            interactive_login(&store).await?;
            println!("{}Login successful. Token saved.{}", style::GREEN, style::RESET);
        }
        AuthAction::Logout => {
            if store.clear().await? {
                println!("Credentials removed.");
            } else {
                println!("No stored credentials.");
            }
        }
        AuthAction::Status => match store.resolve(std::env::var(API_KEY_ENV).ok()).await {
            Ok(credential) => println!("Authenticated via {}.", credential.kind()),
            Err(tern_auth::AuthError::NoCredential) => {
                println!("Not authenticated. Run `tern auth login` or set {API_KEY_ENV}.");
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}

/// Run the authorization-code flow once and persist the token.
///
/// Returns the access token so a fresh session can use it immediately.
pub async fn interactive_login(store: &CredentialStore) -> anyhow::Result<String> {
    let flow = PkceFlow::new();

    println!();
    println!("Open this URL in a browser (on any machine):");
    println!();
    println!("{}{}{}", style::YELLOW, flow.authorize_url(), style::RESET);
    println!();
    println!("Waiting for authorization... (Ctrl+C to cancel)");

    let code = flow.wait_for_code().await?;
    println!("{}Authorization received. Exchanging for token...{}", style::GREEN, style::RESET);

    let token = flow.exchange_code(&code).await?;
    store.store_oauth_token(&token).await?;

    Ok(token)
}
