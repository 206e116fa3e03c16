mod console;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use roomlink_client::{
    ClientConfig, HttpMessagePoster, RoomResolver, RtcPeerLinkFactory, Session, SessionDeps,
    WebSocketChannel,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleObserver;

#[derive(Parser)]
#[command(name = "roomlink", version, about = "Join a WebRTC room as the offering peer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a room link and negotiate a session until either side hangs up.
    Join {
        room_url: String,

        /// Per-request HTTP timeout in seconds.
        #[arg(long, env = "ROOMLINK_TIMEOUT_SECS", default_value_t = 15)]
        timeout: u64,

        #[arg(long, env = "ROOMLINK_MAX_REDIRECTS", default_value_t = 10)]
        max_redirects: usize,

        /// STUN server used when the room lists none.
        #[arg(long, env = "ROOMLINK_STUN")]
        stun: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Join {
            room_url,
            timeout,
            max_redirects,
            stun,
        } => {
            let mut config = ClientConfig {
                request_timeout: Duration::from_secs(timeout),
                max_redirects,
                ..ClientConfig::default()
            };
            if stun.is_some() {
                config.fallback_stun_server = stun;
            }
            join(room_url, config).await
        }
    }
}

async fn join(room_url: String, config: ClientConfig) -> Result<()> {
    println!("{}", format!("🚀 Joining {room_url}").green().bold());

    let http = config
        .http_client()
        .context("Failed to build HTTP client")?;

    let deps = SessionDeps {
        resolver: Arc::new(RoomResolver::new(http.clone(), &config)),
        poster: Arc::new(HttpMessagePoster::new(http)),
        inbound: Arc::new(WebSocketChannel::new(&config)),
        peers: Arc::new(RtcPeerLinkFactory::new(&config)),
        observer: Arc::new(ConsoleObserver),
    };

    let (session, handle) = Session::new(deps);
    tracing::info!("Starting session {}", handle.id());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("{}", "🛑 Hanging up...".yellow());
            handle.hangup().await;
        }
    });

    let reason = session.run(room_url).await;
    if reason.is_failure() {
        anyhow::bail!("Session failed: {reason}");
    }

    println!("{}", "✨ Session closed".green().bold());
    Ok(())
}
