//! Backend connection configuration commands.

use std::path::Path;

use anyhow::Result;

use crate::config::ClientConfig;

/// Set the backend base URL.
pub fn set_server(url: &str, config_path: &Path) -> Result<()> {
    let url = url.trim_end_matches('/');
    if url.is_empty() {
        anyhow::bail!("Server URL must not be empty.");
    }
    let mut config = ClientConfig::load(config_path)?;
    config.server = url.to_string();
    config.save(config_path)?;
    println!("Server set to {url}.");
    Ok(())
}

/// Print the current configuration.
pub fn show(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    println!("Config:   {}", config_path.display());
    println!(
        "Server:   {}",
        if config.server.is_empty() {
            "-"
        } else {
            &config.server
        }
    );
    println!(
        "Session:  {}",
        if config.token.is_empty() {
            "logged out"
        } else {
            "logged in"
        }
    );
    Ok(())
}
