//! tern-proxy: serve the model wire contract via an external agent.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tern_proxy::{create_router, AgentInvoker, Fidelity, ProxyState};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "tern-proxy", version, about = "Forward tern requests to an authenticated CLI agent")]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Forwarding fidelity.
    #[arg(long, value_enum, default_value = "full")]
    fidelity: Fidelity,

    /// External agent command.
    #[arg(long, default_value = "claude")]
    agent: String,

    /// Per-request agent timeout in seconds.
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Print logs to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tern_util::log::init(tern_util::log::LogConfig {
        print: args.verbose,
        ..Default::default()
    });

    let invoker = AgentInvoker::new(&args.agent, Duration::from_secs(args.timeout));

    match invoker.check_available().await {
        Ok(version) => info!(agent = %args.agent, version = %version, "Agent found"),
        Err(e) => {
            warn!(agent = %args.agent, error = %e, "Agent probe failed; requests will error");
        }
    }

    let state = ProxyState {
        invoker: Arc::new(invoker),
        credentials: Arc::new(
            tern_auth::FileCredentialProvider::new().context("cannot locate credential store")?,
        ),
        fidelity: args.fidelity,
    };

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    println!("tern-proxy listening on http://{addr}");
    println!("Point clients at: export TERN_PROXY=\"http://<this-host>:{}/v1/messages\"", args.port);

    info!(addr = %addr, fidelity = ?args.fidelity, "Proxy started");

    axum::serve(listener, create_router(state))
        .await
        .context("server error")?;

    Ok(())
}
