//! System registry commands.

use std::path::Path;

use anyhow::Result;

use super::{build_client, require_session, sync_client};

/// List registered systems.
pub async fn list(json_output: bool, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    sync_client(&client).await?;

    let state = client.state();
    if json_output {
        println!("{}", serde_json::to_string_pretty(&state.systems)?);
        return Ok(());
    }

    if state.systems.is_empty() {
        println!("No systems registered.");
        return Ok(());
    }
    println!("{:>6}  {}", "ID", "NAME");
    for sys in &state.systems {
        println!("{:>6}  {}", sys.id, sys.system_name);
    }
    Ok(())
}

/// Register a new system.
pub async fn add(name: &str, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    require_session(&client)?;
    client.commands().register_system(name).await?;
    println!("System \"{}\" registered.", name.trim());
    Ok(())
}
