//! Process-wide session state.
//!
//! The application root creates exactly one [`Session`] at start-up and hands
//! out [`SessionReader`]s to everything that only needs to observe the token.
//! Write access stays with whoever holds the [`Session`] (or the bare
//! [`SessionState`]).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use carepoint_auth::{CookieJarStore, Session};
//!
//! let store = Arc::new(CookieJarStore::new("/home/me/.carepoint/cookies.txt"));
//! let session = Session::restore(store);
//!
//! let reader = session.reader();
//! if reader.is_authenticated() {
//!     // render protected content
//! }
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::PersistenceError;
use crate::storage::TokenStore;
use crate::types::SessionToken;

// =============================================================================
// Session View
// =============================================================================

/// Read access to the current token.
pub trait SessionView {
    /// Current token, if any.
    fn token(&self) -> Option<SessionToken>;

    /// Returns `true` if a token is present.
    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

// =============================================================================
// Session State
// =============================================================================

/// In-memory holder of the current token.
///
/// Every call to [`set_token`](Self::set_token) is a total replacement and
/// wakes every [`SessionReader`]. It does not touch any store; use
/// [`Session::commit_token`] to update memory and storage together.
#[derive(Debug)]
pub struct SessionState {
    tx: watch::Sender<Option<SessionToken>>,
}

impl SessionState {
    /// Creates state holding `initial`.
    #[must_use]
    pub fn new(initial: Option<SessionToken>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Seeds state from `store`.
    ///
    /// An unreadable store is logged and treated as "signed out"; start-up
    /// never fails because of it.
    #[must_use]
    pub fn restore(store: &dyn TokenStore) -> Self {
        let initial = match store.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored session token, starting signed out");
                None
            }
        };
        tracing::debug!(restored = initial.is_some(), "Session state initialized");
        Self::new(initial)
    }

    /// Replaces the current token.
    pub fn set_token(&self, token: Option<SessionToken>) {
        self.tx.send_replace(token);
    }

    /// Returns a read-only handle that observes future replacements.
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl SessionView for SessionState {
    fn token(&self) -> Option<SessionToken> {
        self.tx.borrow().clone()
    }
}

// =============================================================================
// Session Reader
// =============================================================================

/// Read/subscribe capability over [`SessionState`].
#[derive(Debug, Clone)]
pub struct SessionReader {
    rx: watch::Receiver<Option<SessionToken>>,
}

impl SessionReader {
    /// Waits for the next replacement and returns the new value.
    ///
    /// Returns `None` once the owning state has been dropped. Replacements
    /// made while the reader was not waiting coalesce into the latest one.
    pub async fn changed(&mut self) -> Option<Option<SessionToken>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Returns `true` if a replacement happened since the last
    /// [`changed`](Self::changed) call.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

impl SessionView for SessionReader {
    fn token(&self) -> Option<SessionToken> {
        self.rx.borrow().clone()
    }
}

// =============================================================================
// Session
// =============================================================================

/// Session state paired with its durable store.
///
/// Owned by the application root and passed down explicitly.
pub struct Session {
    state: SessionState,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Restores the session from `store`.
    #[must_use]
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let state = SessionState::restore(store.as_ref());
        Self { state, store }
    }

    /// The in-memory state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Returns a read-only handle.
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        self.state.reader()
    }

    /// Replaces the token in memory, then persists the same value.
    ///
    /// `None` clears the store.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting failed. Memory has already been
    /// updated at that point, so the running process sees the new value but a
    /// restart will not.
    pub fn commit_token(&self, token: Option<SessionToken>) -> Result<(), PersistenceError> {
        let present = token.is_some();
        self.state.set_token(token.clone());
        let result = match &token {
            Some(t) => self.store.set(t),
            None => self.store.clear(),
        };

        if let Err(e) = &result {
            tracing::warn!(
                error = %e,
                present,
                "Session token updated in memory but not persisted"
            );
        }
        result
    }

    /// Ends the session.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cookie could not be removed.
    pub fn sign_out(&self) -> Result<(), PersistenceError> {
        let was_signed_in = self.state.is_authenticated();
        self.commit_token(None)?;
        if was_signed_in {
            tracing::info!("Signed out");
        }
        Ok(())
    }

    /// Drops a token that a guarded action found to be stale.
    ///
    /// Call this when a request made with the current token is rejected as
    /// unauthorized. The guard itself never checks validity.
    ///
    /// # Errors
    ///
    /// Returns the store error if the cookie could not be removed.
    pub fn invalidate(&self, reason: &str) -> Result<(), PersistenceError> {
        if self.state.is_authenticated() {
            tracing::info!(reason, "Invalidating stale session");
        }
        self.commit_token(None)
    }
}

impl SessionView for Session {
    fn token(&self) -> Option<SessionToken> {
        self.state.token()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
