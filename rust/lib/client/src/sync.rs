//! Coordinated fetch-and-replace of the two backend collections.
//!
//! One synchronization cycle fetches `/active_system` and `/licenses`
//! concurrently, then either replaces the shared state with the new pair
//! in a single write or leaves it exactly as it was. There is no middle
//! ground and no automatic retry; cycles are triggered by initial entry
//! and by successful mutations only.

use std::sync::{Arc, Mutex, RwLock};

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::model::{ActiveSystem, License, SyncedState};
use crate::session::Session;

/// How one synchronization cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Both collections fetched and the state replaced.
    Updated,
    /// The cycle was superseded or torn down; nothing changed and
    /// nothing is reported.
    Cancelled,
    /// The credential was missing or rejected; nothing changed and the
    /// session signalled navigate-to-login.
    Unauthorized,
}

/// Fetches systems and licenses as one cancelable unit and reconciles
/// them into the shared state.
///
/// Each cycle owns a [`CancellationToken`]; starting a new cycle cancels
/// the previous one, so at most one cycle's results are ever applied.
/// Reconciliation is commutative on response arrival order.
pub struct Synchronizer {
    gateway: Arc<Gateway>,
    session: Arc<Session>,
    state: RwLock<Arc<SyncedState>>,
    cycle: Mutex<CancellationToken>,
}

impl Synchronizer {
    pub fn new(gateway: Arc<Gateway>, session: Arc<Session>) -> Self {
        Self {
            gateway,
            session,
            state: RwLock::new(Arc::new(SyncedState::default())),
            cycle: Mutex::new(CancellationToken::new()),
        }
    }

    /// Snapshot of the last successfully synchronized state.
    pub fn state(&self) -> Arc<SyncedState> {
        self.state.read().unwrap().clone()
    }

    /// Cancel any in-flight cycle without starting a new one (teardown).
    pub fn shutdown(&self) {
        self.cycle.lock().unwrap().cancel();
    }

    /// Run one synchronization cycle.
    pub async fn sync(&self) -> Result<SyncOutcome, ApiError> {
        if !self.session.has_credential() {
            self.session.on_unauthorized();
            return Ok(SyncOutcome::Unauthorized);
        }

        // Supersede the previous cycle before any network activity.
        let cancel = {
            let mut cycle = self.cycle.lock().unwrap();
            cycle.cancel();
            *cycle = CancellationToken::new();
            cycle.clone()
        };

        // Both requests must be in flight before either is awaited; the
        // collections are independent and must not be serialized.
        let (systems, licenses) = tokio::join!(
            self.gateway
                .send(Method::GET, "/active_system", None, &cancel),
            self.gateway.send(Method::GET, "/licenses", None, &cancel),
        );

        if cancel.is_cancelled()
            || matches!(systems, Err(ApiError::Cancelled))
            || matches!(licenses, Err(ApiError::Cancelled))
        {
            debug!("sync cycle superseded, discarding");
            return Ok(SyncOutcome::Cancelled);
        }

        let systems = systems.map_err(|e| {
            warn!("listing systems failed: {e}");
            e
        })?;
        let licenses = licenses.map_err(|e| {
            warn!("listing licenses failed: {e}");
            e
        })?;

        // A rejection of either call kills the whole cycle: data must
        // never be displayed next to a dead session.
        if systems.status() == StatusCode::UNAUTHORIZED
            || licenses.status() == StatusCode::UNAUTHORIZED
        {
            self.session.on_unauthorized();
            return Ok(SyncOutcome::Unauthorized);
        }

        let systems = parse_list::<ActiveSystem>("/active_system", systems).await?;
        let licenses = parse_list::<License>("/licenses", licenses).await?;

        // A superseding cycle may have started while the bodies streamed.
        if cancel.is_cancelled() {
            debug!("sync cycle superseded after fetch, discarding");
            return Ok(SyncOutcome::Cancelled);
        }

        *self.state.write().unwrap() = Arc::new(SyncedState { systems, licenses });
        debug!("synchronized state replaced");
        Ok(SyncOutcome::Updated)
    }
}

/// Parse a list response body. Malformed payloads are a logged,
/// recoverable failure: the caller keeps the previous state.
async fn parse_list<T: DeserializeOwned>(path: &str, resp: Response) -> Result<Vec<T>, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        warn!("GET {path} returned {status}");
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        });
    }
    resp.json::<Vec<T>>().await.map_err(|e| {
        warn!("GET {path} body did not parse: {e}");
        ApiError::Decode(format!("{path}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    fn synchronizer() -> Synchronizer {
        let session = Arc::new(Session::new(Arc::new(MemoryTokenStore::default())));
        let gateway = Arc::new(Gateway::new("http://127.0.0.1:1", session.clone()));
        Synchronizer::new(gateway, session)
    }

    #[test]
    fn initial_state_is_empty() {
        let sync = synchronizer();
        let state = sync.state();
        assert!(state.systems.is_empty());
        assert!(state.licenses.is_empty());
    }

    #[tokio::test]
    async fn sync_without_credential_redirects_without_network() {
        // The gateway points at a closed port: any network attempt would
        // surface as ApiError::Network, not Unauthorized.
        let sync = synchronizer();
        let outcome = sync.sync().await.unwrap();
        assert_eq!(outcome, SyncOutcome::Unauthorized);
        assert_eq!(*sync.state(), SyncedState::default());
    }

    #[test]
    fn state_snapshots_share_the_allocation() {
        let sync = synchronizer();
        let a = sync.state();
        let b = sync.state();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
