use async_trait::async_trait;
use colored::*;
use roomlink_client::{IceServerEntry, SessionObserver, SessionState, TerminationReason};

/// Prints session progress to the terminal.
pub struct ConsoleObserver;

#[async_trait]
impl SessionObserver for ConsoleObserver {
    async fn on_ice_servers_ready(&self, ice_servers: &[IceServerEntry]) {
        println!(
            "{}",
            format!("🧊 Room resolved with {} ICE servers", ice_servers.len()).cyan()
        );
        for server in ice_servers {
            println!("   {}", server.url);
        }
    }

    async fn on_state_changed(&self, state: SessionState) {
        let line = format!("➡️  {state}");
        match state {
            SessionState::Connected => println!("{}", line.green().bold()),
            SessionState::Terminated => println!("{}", line.dimmed()),
            _ => println!("{}", line.cyan()),
        }
    }

    async fn on_terminated(&self, reason: &TerminationReason) {
        if reason.is_failure() {
            eprintln!("{}", format!("❌ {reason}").red().bold());
        } else {
            println!("{}", format!("👋 {reason}").yellow());
        }
    }
}
