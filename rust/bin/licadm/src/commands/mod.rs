//! CLI command implementations.

pub mod licenses;
pub mod login;
pub mod server;
pub mod status;
pub mod systems;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use licadm_client::{Client, SyncOutcome};

use crate::config::{ClientConfig, FileTokenStore};

/// Build the API client for the configured backend.
pub(crate) fn build_client(config_path: &Path) -> Result<Client> {
    let config = ClientConfig::load(config_path)?;
    if config.server.is_empty() {
        anyhow::bail!("No server configured. Run `licadm config set-server <url>`.");
    }
    let store = Arc::new(FileTokenStore::new(config_path.to_path_buf()));
    Ok(Client::new(config.server, store))
}

/// Reject early when no credential is held, before any network call.
pub(crate) fn require_session(client: &Client) -> Result<()> {
    if !client.session().has_credential() {
        anyhow::bail!("Not logged in. Run `licadm login`.");
    }
    Ok(())
}

/// Run one synchronization, translating outcomes for a one-shot CLI:
/// a dead session becomes the log-in-again message and a nonzero exit.
pub(crate) async fn sync_client(client: &Client) -> Result<()> {
    match client.sync().await? {
        SyncOutcome::Updated | SyncOutcome::Cancelled => Ok(()),
        SyncOutcome::Unauthorized => {
            anyhow::bail!("Not logged in or session expired. Run `licadm login`.")
        }
    }
}
