//! licadm-client: session-gated client for the license-issuance backend.
//!
//! The crate is organized around five collaborators:
//!
//! - [`Session`] guards the bearer credential and signals
//!   navigate-to-login through a watch channel.
//! - [`Gateway`] is the sole point of contact with the backend.
//! - [`Synchronizer`] fetches the systems and licenses collections as one
//!   cancelable unit and replaces the shared state atomically.
//! - [`Commands`] validates and submits mutations, resynchronizing on
//!   success.
//! - [`view::project`] derives the filtered, paginated license view.
//!
//! [`Client`] wires them together with an explicit credential lifecycle:
//! installed on login, torn down on logout or the first backend 401.
//! There is no ambient global token; the session object is injected
//! wherever the credential is needed.

pub mod commands;
pub mod error;
pub mod gateway;
pub mod model;
pub mod session;
pub mod sync;
pub mod view;

use std::sync::Arc;

pub use commands::{parse_ip_limit, Commands};
pub use error::ApiError;
pub use gateway::Gateway;
pub use model::{ActiveSystem, License, SyncedState};
pub use session::{MemoryTokenStore, Session, SessionPhase, TokenStore};
pub use sync::{SyncOutcome, Synchronizer};
pub use view::{project, LicensePage, ViewCursor, PAGE_SIZE};

/// Everything the operator surface needs, wired together.
pub struct Client {
    session: Arc<Session>,
    gateway: Arc<Gateway>,
    synchronizer: Arc<Synchronizer>,
    commands: Commands,
}

impl Client {
    /// Build a client against `base_url`, recovering any credential the
    /// store still holds.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn TokenStore>) -> Self {
        let session = Arc::new(Session::new(store));
        let gateway = Arc::new(Gateway::new(base_url, Arc::clone(&session)));
        let synchronizer = Arc::new(Synchronizer::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
        ));
        let commands = Commands::new(
            Arc::clone(&gateway),
            Arc::clone(&session),
            Arc::clone(&synchronizer),
        );
        Self {
            session,
            gateway,
            synchronizer,
            commands,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn commands(&self) -> &Commands {
        &self.commands
    }

    /// Authenticate and install the credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let token = self.gateway.login(username, password).await?;
        self.session.install(token);
        Ok(())
    }

    /// Drop the credential and cancel any in-flight synchronization.
    pub fn logout(&self) {
        self.synchronizer.shutdown();
        self.session.logout();
    }

    /// Run one synchronization cycle.
    pub async fn sync(&self) -> Result<SyncOutcome, ApiError> {
        self.synchronizer.sync().await
    }

    /// Snapshot of the last synchronized state.
    pub fn state(&self) -> Arc<SyncedState> {
        self.synchronizer.state()
    }

    /// Cancel in-flight work without touching the credential (component
    /// teardown).
    pub fn shutdown(&self) {
        self.synchronizer.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_starts_with_empty_state() {
        let client = Client::new(
            "http://127.0.0.1:1",
            Arc::new(MemoryTokenStore::default()),
        );
        assert!(!client.session().has_credential());
        assert!(client.state().licenses.is_empty());
    }

    #[test]
    fn logout_signals_anonymous() {
        let store = Arc::new(MemoryTokenStore::default());
        store.save("tok");
        let client = Client::new("http://127.0.0.1:1", store);
        assert!(client.session().has_credential());

        client.logout();
        assert!(!client.session().has_credential());
        assert_eq!(*client.session().phase().borrow(), SessionPhase::Anonymous);
    }
}
