//! Operator mutation commands.
//!
//! Each command validates its input, calls the gateway, and on success
//! re-runs a full synchronization. There is no optimistic local write:
//! displayed data always traces back to a real synchronization, so a
//! rejected mutation leaves the stale value on screen, matching the fact
//! that the backend did not change it either.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::ApiError;
use crate::gateway::{error_detail, Gateway};
use crate::session::Session;
use crate::sync::Synchronizer;

/// Normalize the operator's raw IP-limit input.
///
/// Empty (after trimming) means unlimited. Anything else must parse as a
/// non-negative integer; failures never reach the network and keep the
/// previously displayed value untouched.
pub fn parse_ip_limit(raw: &str) -> Result<Option<u32>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(ApiError::Validation(
            "IP limit must be zero or a positive whole number".into(),
        )),
        Ok(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| ApiError::Validation("IP limit is out of range".into())),
        Err(_) => Err(ApiError::Validation(
            "IP limit must be a whole number, or empty for unlimited".into(),
        )),
    }
}

/// The three mutations, sharing one gateway and synchronizer.
pub struct Commands {
    gateway: Arc<Gateway>,
    session: Arc<Session>,
    sync: Arc<Synchronizer>,
}

impl Commands {
    pub fn new(gateway: Arc<Gateway>, session: Arc<Session>, sync: Arc<Synchronizer>) -> Self {
        Self {
            gateway,
            session,
            sync,
        }
    }

    /// Register a new system. Blank names are rejected locally.
    pub async fn register_system(&self, name: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("system name must not be blank".into()));
        }
        self.submit(Method::POST, "/active_system", json!({ "system_name": name }))
            .await?;
        info!("registered system {name:?}");
        Ok(())
    }

    /// Mint a license key bound to the selected system.
    ///
    /// The key's content and format are wholly the backend's business.
    pub async fn issue_license(&self, system_id: Option<i64>) -> Result<(), ApiError> {
        let id = system_id.ok_or_else(|| {
            ApiError::Validation("select a system before issuing a license".into())
        })?;
        self.submit(Method::POST, "/generate", json!({ "active_system_id": id }))
            .await?;
        info!("issued license under system {id}");
        Ok(())
    }

    /// Cap, or uncap, the number of distinct IPs a key may be used from.
    ///
    /// Takes the operator's raw input so the empty-means-unlimited rule
    /// lives here; see [`parse_ip_limit`]. Submitting the same pair twice
    /// succeeds twice and leaves the backend unchanged.
    pub async fn update_ip_limit(&self, license_key: &str, raw_input: &str) -> Result<(), ApiError> {
        let limit = parse_ip_limit(raw_input)?;
        let path = format!("/license_key/{license_key}");
        self.submit(Method::PATCH, &path, json!({ "ip_limit": limit }))
            .await?;
        match limit {
            Some(n) => info!("ip limit for {license_key} set to {n}"),
            None => info!("ip limit for {license_key} removed"),
        }
        Ok(())
    }

    /// Shared tail: send, interpret the status, resynchronize on success
    /// so the display reflects backend-confirmed truth (the backend may
    /// normalize what it stored).
    async fn submit(
        &self,
        method: Method,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), ApiError> {
        let cancel = CancellationToken::new();
        let resp = self.gateway.send(method, path, Some(&body), &cancel).await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.on_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_detail(resp).await,
            });
        }

        self.sync.sync().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_means_unlimited() {
        assert_eq!(parse_ip_limit("").unwrap(), None);
        assert_eq!(parse_ip_limit("   ").unwrap(), None);
        assert_eq!(parse_ip_limit("\t\n").unwrap(), None);
    }

    #[test]
    fn non_negative_integers_pass() {
        assert_eq!(parse_ip_limit("0").unwrap(), Some(0));
        assert_eq!(parse_ip_limit("5").unwrap(), Some(5));
        assert_eq!(parse_ip_limit(" 42 ").unwrap(), Some(42));
    }

    #[test]
    fn negative_is_a_validation_error() {
        assert!(parse_ip_limit("-1").unwrap_err().is_validation());
        assert!(parse_ip_limit("-999").unwrap_err().is_validation());
    }

    #[test]
    fn non_numeric_is_a_validation_error() {
        assert!(parse_ip_limit("abc").unwrap_err().is_validation());
        assert!(parse_ip_limit("3.5").unwrap_err().is_validation());
        assert!(parse_ip_limit("5x").unwrap_err().is_validation());
    }

    #[test]
    fn out_of_range_is_a_validation_error() {
        // Larger than any plausible cap the backend stores as u32.
        assert!(parse_ip_limit("4294967296").unwrap_err().is_validation());
        assert_eq!(parse_ip_limit("4294967295").unwrap(), Some(u32::MAX));
    }
}
