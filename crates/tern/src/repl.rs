//! Interactive read-eval loop.

use crate::style;
use std::io::Write;
use std::path::Path;
use tern_core::{command, Config, Session, SessionCommand, SessionEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Print the startup banner.
pub fn print_banner(config: &Config, auth_label: &str, cwd: &Path) {
    println!(
        "{}tern{} v{} - AI coding assistant",
        style::BOLD,
        style::RESET,
        env!("CARGO_PKG_VERSION")
    );
    println!("Model: {}{}{}", style::CYAN, config.model, style::RESET);
    println!("Auth: {}{}{}", style::GREEN, auth_label, style::RESET);
    println!("Working directory: {}{}{}", style::CYAN, cwd.display(), style::RESET);
    println!();
    println!("Type your message and press Enter. Use /help for commands.");
    println!();
}

/// Run the session loop until `/quit` or end of input.
pub async fn run(mut session: Session) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("{}>{} ", style::GREEN, style::RESET);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\n{}Goodbye!{}", style::CYAN, style::RESET);
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        // Session commands never interleave with an in-flight exchange.
        match SessionCommand::parse(&line) {
            Some(SessionCommand::Quit) => {
                println!("{}Goodbye!{}", style::CYAN, style::RESET);
                break;
            }
            Some(SessionCommand::Clear) => {
                session.clear();
                println!("{}Conversation cleared.{}", style::YELLOW, style::RESET);
                continue;
            }
            Some(SessionCommand::Login) => {
                let store = tern_auth::CredentialStore::new()?;
                match crate::commands::auth::interactive_login(&store).await {
                    Ok(_) => println!("{}Logged in successfully. Restart tern to use the new token.{}", style::GREEN, style::RESET),
                    Err(e) => println!("{}Login failed: {e}{}", style::RED, style::RESET),
                }
                continue;
            }
            Some(SessionCommand::Help) => {
                println!("{}", command::HELP_TEXT);
                continue;
            }
            None => {}
        }

        println!();
        run_one_turn(&mut session, &line).await;
        println!();
    }

    Ok(())
}

/// Drive one turn, rendering events as they arrive.
async fn run_one_turn(session: &mut Session, line: &str) {
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::Text(text) => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                SessionEvent::ToolStarted { name, .. } => {
                    println!("\n{}  → Executing {name}...{}", style::DIM, style::RESET);
                }
                SessionEvent::ToolCompleted { success, .. } => {
                    if !success {
                        println!("{}  (tool reported an error){}", style::DIM, style::RESET);
                    }
                }
            }
        }
    });

    let result = session.run_turn(line, &tx).await;
    drop(tx);
    let _ = printer.await;

    match result {
        Ok(_) => println!(),
        Err(e) => {
            // Transport and API errors surface directly; the turn is
            // aborted, never silently retried.
            println!("{}Error: {e}{}", style::RED, style::RESET);
        }
    }
}
