//! Login / logout commands.

use std::path::Path;

use anyhow::Result;
use licadm_client::ApiError;

use super::build_client;

/// Login to the configured backend and store the token.
pub async fn login(username: &str, password: &str, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    match client.login(username, password).await {
        Ok(()) => {
            println!("Logged in as {username}.");
            Ok(())
        }
        Err(ApiError::Server { message, .. }) => anyhow::bail!("Login failed: {message}"),
        Err(e) => Err(e.into()),
    }
}

/// Logout: discard the stored credential.
pub fn logout(config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    client.logout();
    println!("Logged out.");
    Ok(())
}
