//! Token store trait.
//!
//! # Implementation Notes
//!
//! Implementations must:
//!
//! - Hold at most one token; `set` replaces, never appends
//! - Make `set` and `clear` durable before returning
//! - Never log the token value

use std::sync::Mutex;

use crate::error::PersistenceError;
use crate::types::SessionToken;

/// Storage for the single authentication token.
///
/// Methods are synchronous: the session never observes a store write that
/// is still in flight.
pub trait TokenStore: Send + Sync {
    /// Reads the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self) -> Result<Option<SessionToken>, PersistenceError>;

    /// Stores `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write could not be made durable.
    fn set(&self, token: &SessionToken) -> Result<(), PersistenceError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be made durable.
    fn clear(&self) -> Result<(), PersistenceError>;
}

/// In-memory token store.
///
/// Does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    #[must_use]
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionToken>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<SessionToken>, PersistenceError> {
        Ok(self.slot().clone())
    }

    fn set(&self, token: &SessionToken) -> Result<(), PersistenceError> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        *self.slot() = None;
        Ok(())
    }
}
