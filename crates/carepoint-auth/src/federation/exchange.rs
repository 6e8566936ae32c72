//! Credential exchange.
//!
//! Wraps an [`IdentityProvider`], classifies its failures into [`AuthError`]
//! and emits one notice per attempt. It does not touch the session; see
//! [`crate::flow`] for committing the result.

use std::sync::Arc;

use super::provider::{IdentityProvider, ProviderError, ProviderGrant};
use crate::error::AuthError;
use crate::notify::{Notice, Notifier};
use crate::types::{Credentials, IdentityRecord, SessionToken};

/// Result of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    /// Token to install as the session token.
    pub token: SessionToken,
    /// Identity the provider vouched for.
    pub identity: IdentityRecord,
}

/// Maps a provider error code onto [`AuthError`].
///
/// Accepts REST codes (`EMAIL_NOT_FOUND`) and client SDK codes
/// (`auth/user-not-found`). Every code without a dedicated kind becomes
/// [`AuthError::Unknown`] carrying the code.
#[must_use]
pub fn classify_provider_code(code: &str) -> AuthError {
    let normalized = code.trim();
    let normalized = normalized
        .split_once(" : ")
        .map_or(normalized, |(code, _)| code.trim());

    match normalized {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" | "auth/user-not-found" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "auth/wrong-password" => AuthError::WrongPassword,
        "INVALID_LOGIN_CREDENTIALS"
        | "INVALID_CREDENTIAL"
        | "INVALID_EMAIL"
        | "MISSING_PASSWORD"
        | "auth/invalid-credential"
        | "auth/invalid-login-credentials"
        | "auth/invalid-email"
        | "auth/missing-password" => AuthError::InvalidCredential,
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "auth/too-many-requests" => AuthError::RateLimited,
        other => AuthError::unknown(other),
    }
}

/// Maps any provider failure onto [`AuthError`].
#[must_use]
pub fn classify_provider_error(error: &ProviderError) -> AuthError {
    match error {
        ProviderError::Rejected { code, message } => match classify_provider_code(code) {
            AuthError::Unknown { .. } if !message.is_empty() => {
                AuthError::unknown(format!("{code}: {message}"))
            }
            classified => classified,
        },
        ProviderError::Network(e) if e.is_timeout() => {
            AuthError::unknown("identity provider timed out")
        }
        ProviderError::Network(_) => AuthError::unknown("identity provider unreachable"),
        ProviderError::Malformed(m) => AuthError::unknown(format!("unexpected response: {m}")),
    }
}

/// Trades credentials for a session token.
#[derive(Clone)]
pub struct CredentialExchange {
    provider: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
}

impl CredentialExchange {
    /// Creates an exchange over `provider`, reporting to `notifier`.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self { provider, notifier }
    }

    /// Submits `credentials` to the provider.
    ///
    /// Emits a success or failure notice before returning.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AuthError`]; the caller decides how to reset
    /// its own submission state.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignIn, AuthError> {
        let result = self
            .provider
            .exchange_credentials(credentials.email(), credentials.password())
            .await
            .map_err(|e| {
                tracing::debug!(provider = self.provider.name(), error = %e, "Provider refused sign-in");
                classify_provider_error(&e)
            })
            .and_then(into_sign_in);

        match &result {
            Ok(sign_in) => {
                tracing::info!(
                    provider = self.provider.name(),
                    user_id = %sign_in.identity.user_id,
                    "Signed in"
                );
                self.notifier.notify(Notice::success("Signed in successfully."));
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    category = %e.category(),
                    error = %e,
                    "Sign-in failed"
                );
                self.notifier.notify(Notice::error(e.user_message()));
            }
        }
        result
    }
}

impl std::fmt::Debug for CredentialExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialExchange")
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

fn into_sign_in(grant: ProviderGrant) -> Result<SignIn, AuthError> {
    let token = SessionToken::new(grant.id_token)
        .ok_or_else(|| AuthError::unknown("identity provider returned an empty token"))?;
    if grant.user_id.is_empty() {
        return Err(AuthError::unknown(
            "identity provider returned no user identifier",
        ));
    }

    Ok(SignIn {
        identity: IdentityRecord {
            user_id: grant.user_id,
            email: grant.email,
            raw_token: token.clone(),
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
        },
        token,
    })
}
