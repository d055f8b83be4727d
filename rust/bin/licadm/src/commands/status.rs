//! Server/session status command.

use std::path::Path;

use anyhow::Result;
use licadm_client::SyncOutcome;

use super::build_client;
use crate::config::ClientConfig;

/// Check backend reachability and whether the stored session is alive.
pub async fn status(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    println!(
        "Server:  {}",
        if config.server.is_empty() {
            "-"
        } else {
            &config.server
        }
    );
    if config.server.is_empty() {
        println!("Status:  no server configured");
        return Ok(());
    }

    let client = build_client(config_path)?;
    if !client.session().has_credential() {
        println!("Status:  logged out");
        return Ok(());
    }

    match client.sync().await {
        Ok(SyncOutcome::Updated) => {
            let state = client.state();
            println!(
                "Status:  connected ({} systems, {} licenses)",
                state.systems.len(),
                state.licenses.len()
            );
        }
        Ok(SyncOutcome::Unauthorized) => println!("Status:  session expired"),
        Ok(SyncOutcome::Cancelled) => {}
        Err(e) => println!("Status:  disconnected ({e})"),
    }
    Ok(())
}
