//! tern: AI coding assistant CLI.

mod commands;
mod repl;
mod style;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tern_auth::{Credential, CredentialStore, API_KEY_ENV};
use tern_core::{Config, Session};
use tern_provider::anthropic::{AnthropicClient, AuthHeader};
use tern_tools::ToolRegistry;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tern", version, about = "AI coding assistant for the terminal")]
struct Args {
    /// Model identifier.
    #[arg(long)]
    model: Option<String>,

    /// Token budget ceiling per response.
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Maximum tool-use rounds per turn.
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Print logs to stderr.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage credentials.
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tern_util::log::init(tern_util::log::LogConfig {
        print: args.verbose,
        ..Default::default()
    });

    if let Some(Command::Auth { action }) = args.command {
        return commands::auth::run(action).await;
    }

    let mut config = Config::from_env();
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }

    let cwd = std::env::current_dir().context("cannot determine working directory")?;

    // Credential resolution happens once per session. A proxy override
    // suppresses the auth header entirely; the proxy carries its own
    // authentication downstream.
    let (client, auth_label) = if let Some(proxy) = &config.proxy_url {
        info!(proxy = %proxy, "Using proxy endpoint");
        (
            AnthropicClient::with_base_url(AuthHeader::None, proxy)?,
            format!("proxy {proxy}"),
        )
    } else {
        let store = CredentialStore::new()?;
        let credential = match store.resolve(std::env::var(API_KEY_ENV).ok()).await {
            Ok(credential) => credential,
            Err(tern_auth::AuthError::NoCredential) => {
                // No saved auth anywhere: interactive flow, run once,
                // token persisted for the next process start.
                println!("{}No authentication found. Starting OAuth login...{}", style::YELLOW, style::RESET);
                let token = commands::auth::interactive_login(&store).await?;
                Credential::OAuth(token)
            }
            Err(e) => return Err(e.into()),
        };

        let label = credential.kind().to_string();
        let auth = match credential {
            Credential::ApiKey(key) => AuthHeader::ApiKey(key),
            Credential::OAuth(token) => AuthHeader::Bearer(token),
        };
        (AnthropicClient::new(auth)?, label)
    };

    repl::print_banner(&config, &auth_label, &cwd);

    let session = Session::new(
        Arc::new(client),
        Arc::new(ToolRegistry::with_builtins()),
        config,
        cwd,
    );

    repl::run(session).await
}
