//! Identity provider capability.
//!
//! The provider is an external collaborator. This crate only consumes its
//! credential exchange operation and never reimplements it.

use async_trait::async_trait;

/// Tokens and identity issued by the provider for one successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGrant {
    /// Identity token issued by the provider (used as the session token).
    pub id_token: String,

    /// Provider-assigned user identifier.
    pub user_id: String,

    /// Email on file, if returned.
    pub email: Option<String>,

    /// Refresh token, if issued.
    pub refresh_token: Option<String>,

    /// Lifetime of `id_token` in seconds, if reported.
    pub expires_in: Option<u64>,
}

/// Raw failure from the provider, before classification.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered and refused the exchange.
    #[error("Provider rejected sign-in: {code}")]
    Rejected {
        /// Provider error code (e.g. `EMAIL_NOT_FOUND`, `auth/wrong-password`).
        code: String,
        /// Human-readable description, if any.
        message: String,
    },

    /// The request never produced a provider answer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with something that could not be understood.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Creates a `Rejected` error.
    #[must_use]
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// External identity provider.
///
/// # Example Implementation
///
/// ```ignore
/// struct Emulator;
///
/// #[async_trait::async_trait]
/// impl IdentityProvider for Emulator {
///     fn name(&self) -> &str { "emulator" }
///
///     async fn exchange_credentials(&self, email: &str, password: &str)
///         -> Result<ProviderGrant, ProviderError>
///     {
///         Err(ProviderError::rejected("EMAIL_NOT_FOUND", ""))
///     }
/// }
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Trades an email/password pair for an identity token.
    ///
    /// One round trip; no retries.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] describing why no token was issued.
    async fn exchange_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderGrant, ProviderError>;
}
