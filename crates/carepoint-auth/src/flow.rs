//! Sign-in flow: exchange, then commit.
//!
//! The exchange is the only operation that suspends. While it is in flight
//! the guard keeps evaluating the previous session. When it resolves, the
//! token is committed only if the component that asked for it still exists;
//! otherwise the result is dropped.

use std::sync::{Arc, Weak};

use crate::error::{AuthError, PersistenceError};
use crate::federation::CredentialExchange;
use crate::session::Session;
use crate::types::{Credentials, IdentityRecord};

/// Liveness marker held by the component that started a sign-in.
///
/// Dropping it (e.g. when the sign-in form is torn down) turns every
/// [`RequesterHandle`] dead.
#[derive(Debug, Default)]
pub struct Requester {
    alive: Arc<()>,
}

impl Requester {
    /// Creates a live requester.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle the flow checks before writing state.
    #[must_use]
    pub fn handle(&self) -> RequesterHandle {
        RequesterHandle {
            alive: Arc::downgrade(&self.alive),
        }
    }
}

/// Weak view of a [`Requester`].
#[derive(Debug, Clone)]
pub struct RequesterHandle {
    alive: Weak<()>,
}

impl RequesterHandle {
    /// Returns `true` while the requester exists.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// What happened to a successful exchange.
#[derive(Debug)]
pub enum SignInOutcome {
    /// The token was installed in the session.
    Committed {
        /// Identity returned by the provider.
        identity: IdentityRecord,
        /// Why the cookie jar write failed, if it did. The session is then
        /// signed in for this process only.
        persist_error: Option<PersistenceError>,
    },
    /// The requester went away before the exchange resolved; nothing changed.
    Discarded,
}

/// Runs credential exchanges against one session.
#[derive(Debug)]
pub struct SignInFlow<'a> {
    exchange: &'a CredentialExchange,
    session: &'a Session,
}

impl<'a> SignInFlow<'a> {
    /// Creates a flow writing to `session`.
    #[must_use]
    pub fn new(exchange: &'a CredentialExchange, session: &'a Session) -> Self {
        Self { exchange, session }
    }

    /// Signs in and commits the token if `requester` is still live.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AuthError`] when the exchange fails. The
    /// session is left untouched in that case.
    pub async fn run(
        &self,
        credentials: &Credentials,
        requester: &RequesterHandle,
    ) -> Result<SignInOutcome, AuthError> {
        let sign_in = self.exchange.sign_in(credentials).await?;

        if !requester.is_live() {
            tracing::debug!("Sign-in requester is gone, discarding token");
            return Ok(SignInOutcome::Discarded);
        }

        let persist_error = self.session.commit_token(Some(sign_in.token)).err();
        Ok(SignInOutcome::Committed {
            identity: sign_in.identity,
            persist_error,
        })
    }
}
