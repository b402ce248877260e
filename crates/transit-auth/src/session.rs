//! Deauthenticate signal towards the session owner.
//!
//! The gateway does not know what "logout" means for the application. It only
//! calls [`SessionListener::on_deauthenticated`]; the owner decides whether to
//! clear credentials, route to a login screen, and so on.

use tokio::sync::watch;
use tracing::info;

/// Receiver of the fire-and-forget deauthenticate notification.
///
/// Implementations must not block and must tolerate repeated calls.
pub trait SessionListener: Send + Sync {
    fn on_deauthenticated(&self);
}

/// Listener that ignores the signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSessionListener;

impl SessionListener for NoopSessionListener {
    fn on_deauthenticated(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Deauthenticated,
}

/// Observable session state.
///
/// Deauthenticating an already deauthenticated session is a no-op, so
/// subscribers see each logout once.
#[derive(Debug)]
pub struct SessionHandle {
    tx: watch::Sender<SessionState>,
}

impl SessionHandle {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn authenticated() -> Self {
        Self::new(SessionState::Authenticated)
    }

    pub fn deauthenticated() -> Self {
        Self::new(SessionState::Deauthenticated)
    }

    pub fn state(&self) -> SessionState {
        *self.tx.borrow()
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Enter the authenticated state (after login).
    pub fn mark_authenticated(&self) -> bool {
        self.transition(SessionState::Authenticated)
    }

    /// Enter the deauthenticated state. Returns whether the state changed.
    pub fn deauthenticate(&self) -> bool {
        let changed = self.transition(SessionState::Deauthenticated);
        if changed {
            info!("Session deauthenticated");
        }
        changed
    }

    fn transition(&self, next: SessionState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        })
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::deauthenticated()
    }
}

impl SessionListener for SessionHandle {
    fn on_deauthenticated(&self) {
        self.deauthenticate();
    }
}
