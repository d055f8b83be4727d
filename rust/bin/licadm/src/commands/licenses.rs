//! License key commands: listing, issuing, capping.

use std::path::Path;

use anyhow::Result;
use licadm_client::{parse_ip_limit, project, ViewCursor};

use super::{build_client, require_session, sync_client};

/// List license keys, filtered and paginated.
pub async fn list(search: &str, page: usize, json_output: bool, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    sync_client(&client).await?;

    let state = client.state();
    let mut cursor = ViewCursor::new();
    cursor.set_search(search);

    if page != 1 {
        let total_pages = project(&state, &cursor).total_pages;
        cursor.set_page(page, total_pages);
        if cursor.page() != page {
            anyhow::bail!("Page {page} is out of range (1..={total_pages}).");
        }
    }

    let view = project(&state, &cursor);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&view.rows)?);
        return Ok(());
    }

    if view.rows.is_empty() {
        println!("No licenses match.");
    } else {
        println!(
            "{:<24}  {:<20}  {:<19}  {}",
            "KEY", "SYSTEM", "CREATED", "IP LIMIT"
        );
        for lic in &view.rows {
            let limit = lic
                .ip_limit
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unlimited".into());
            println!(
                "{:<24}  {:<20}  {:<19}  {}",
                lic.license_key,
                lic.active_system.as_deref().unwrap_or("-"),
                lic.create_at.format("%Y-%m-%d %H:%M:%S"),
                limit,
            );
        }
    }

    let mut nav = Vec::new();
    if view.has_prev() {
        nav.push(format!("prev: --page {}", view.page - 1));
    }
    if view.has_next() {
        nav.push(format!("next: --page {}", view.page + 1));
    }
    if nav.is_empty() {
        println!("Page {} / {}", view.page, view.total_pages);
    } else {
        println!(
            "Page {} / {}  ({})",
            view.page,
            view.total_pages,
            nav.join(", ")
        );
    }
    Ok(())
}

/// Issue a new license key under a system.
pub async fn issue(system_id: i64, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    require_session(&client)?;
    client.commands().issue_license(Some(system_id)).await?;

    // The resynchronized state carries the backend-generated key.
    let state = client.state();
    match state.licenses.last() {
        Some(lic) => println!("License issued: {}", lic.license_key),
        None => println!("License issued."),
    }
    Ok(())
}

/// Cap, or uncap, the number of distinct IPs a key may be used from.
pub async fn set_ip_limit(key: &str, raw_limit: &str, config_path: &Path) -> Result<()> {
    let client = build_client(config_path)?;
    require_session(&client)?;
    client.commands().update_ip_limit(key, raw_limit).await?;

    // Already validated by the command; re-parse only to word the message.
    match parse_ip_limit(raw_limit)? {
        Some(n) => println!("IP limit for {key} set to {n}."),
        None => println!("IP limit for {key} removed (unlimited)."),
    }
    Ok(())
}
