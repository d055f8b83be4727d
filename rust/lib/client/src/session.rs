//! Session guard: holds the bearer credential and the login-redirect
//! signal.
//!
//! At most one credential exists at a time and its presence is the sole
//! local authentication check; the backend is authoritative and answers
//! 401 when it disagrees.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::info;

/// Whether the client currently holds a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No credential held; the operator must log in.
    Anonymous,
    /// A credential is held (validity is the backend's call).
    Authenticated,
}

/// Pluggable credential persistence.
///
/// The CLI backs this with its config file; tests and embedders use
/// [`MemoryTokenStore`]. Persistence is best-effort: a store that cannot
/// write must not take the session down with it, so implementations log
/// and swallow their own I/O failures.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// In-memory store with no persistence.
#[derive(Default)]
pub struct MemoryTokenStore(RwLock<Option<String>>);

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.0.read().unwrap().clone()
    }

    fn save(&self, token: &str) {
        *self.0.write().unwrap() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.0.write().unwrap() = None;
    }
}

/// Holds the bearer credential and broadcasts phase changes.
///
/// The phase dropping to [`SessionPhase::Anonymous`] is the
/// "navigate to login" signal; the operator surface observes it through
/// [`Session::phase`]. All credential writes go through this type.
pub struct Session {
    token: RwLock<Option<String>>,
    store: Arc<dyn TokenStore>,
    phase: watch::Sender<SessionPhase>,
}

impl Session {
    /// Create a session, recovering any persisted credential.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load().filter(|t| !t.is_empty());
        let initial = if token.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        };
        let (phase, _) = watch::channel(initial);
        Self {
            token: RwLock::new(token),
            store,
            phase,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.token.read().unwrap().is_some()
    }

    /// Current bearer token, if any. Read-only view for the gateway.
    pub fn bearer(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    /// Install a fresh credential after a successful login.
    pub fn install(&self, token: String) {
        self.store.save(&token);
        *self.token.write().unwrap() = Some(token);
        self.set_phase(SessionPhase::Authenticated);
        info!("session opened");
    }

    /// The backend rejected the credential: drop it and signal login.
    ///
    /// Idempotent; repeated rejections collapse into a single phase
    /// change, so one sync cycle produces at most one redirect.
    pub fn on_unauthorized(&self) {
        if self.token.write().unwrap().take().is_some() {
            info!("credential rejected by backend, session closed");
        }
        self.store.clear();
        self.set_phase(SessionPhase::Anonymous);
    }

    /// Drop the credential unconditionally (operator logout).
    pub fn logout(&self) {
        *self.token.write().unwrap() = None;
        self.store.clear();
        self.set_phase(SessionPhase::Anonymous);
        info!("session closed by operator");
    }

    /// Subscribe to phase changes. A transition to
    /// [`SessionPhase::Anonymous`] means "navigate to login".
    pub fn phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    // Notify only on a real transition.
    fn set_phase(&self, next: SessionPhase) {
        self.phase.send_if_modified(|current| {
            if *current != next {
                *current = next;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous_session() -> Session {
        Session::new(Arc::new(MemoryTokenStore::default()))
    }

    #[test]
    fn starts_anonymous_with_empty_store() {
        let session = anonymous_session();
        assert!(!session.has_credential());
        assert_eq!(*session.phase().borrow(), SessionPhase::Anonymous);
    }

    #[test]
    fn recovers_persisted_credential() {
        let store = Arc::new(MemoryTokenStore::default());
        store.save("tok-123");

        let session = Session::new(store);
        assert!(session.has_credential());
        assert_eq!(session.bearer().as_deref(), Some("tok-123"));
        assert_eq!(*session.phase().borrow(), SessionPhase::Authenticated);
    }

    #[test]
    fn empty_persisted_token_counts_as_absent() {
        let store = Arc::new(MemoryTokenStore::default());
        store.save("");

        let session = Session::new(store);
        assert!(!session.has_credential());
    }

    #[test]
    fn install_persists_and_signals() {
        let store = Arc::new(MemoryTokenStore::default());
        let session = Session::new(store.clone());
        let mut rx = session.phase();

        session.install("tok-9".into());
        assert!(session.has_credential());
        assert_eq!(store.load().as_deref(), Some("tok-9"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionPhase::Authenticated);
    }

    #[test]
    fn on_unauthorized_clears_credential_and_store() {
        let store = Arc::new(MemoryTokenStore::default());
        store.save("dead-token");
        let session = Session::new(store.clone());

        session.on_unauthorized();
        assert!(!session.has_credential());
        assert_eq!(store.load(), None);
        assert_eq!(*session.phase().borrow(), SessionPhase::Anonymous);
    }

    #[test]
    fn repeated_unauthorized_signals_once() {
        let store = Arc::new(MemoryTokenStore::default());
        store.save("dead-token");
        let session = Session::new(store);
        let mut rx = session.phase();
        rx.borrow_and_update();

        session.on_unauthorized();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        // Second rejection in the same cycle: no further notification.
        session.on_unauthorized();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn logout_clears_unconditionally() {
        let session = anonymous_session();
        session.logout();
        assert!(!session.has_credential());

        session.install("tok".into());
        session.logout();
        assert!(!session.has_credential());
        assert_eq!(*session.phase().borrow(), SessionPhase::Anonymous);
    }
}
