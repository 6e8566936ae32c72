//! # carepoint-auth
//!
//! Session and sign-in gating for the CarePoint booking client.
//!
//! This crate provides:
//! - A durable token store backed by a cookie jar
//! - Process-wide session state that readers can subscribe to
//! - Credential exchange against an external identity provider, with a
//!   closed error taxonomy
//! - An access guard that renders protected content or redirects to sign-in
//!
//! ## Control flow
//!
//! ```text
//! CredentialExchange ──token──▶ Session::commit_token ──▶ SessionState (memory)
//!                                                    └──▶ TokenStore  (cookie jar)
//! AccessGuard ◀──reads── SessionReader   (every protected render)
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Identity provider, cookie and route configuration
//! - [`error`] - Sign-in and persistence error types
//! - [`federation`] - Identity provider boundary and credential exchange
//! - [`flow`] - Sign-in flow with requester liveness
//! - [`guard`] - Access guard for protected pages
//! - [`notify`] - User-facing notification boundary
//! - [`session`] - Session state and the state/store pair
//! - [`storage`] - Token store trait and implementations
//! - [`types`] - Session token, identity record, credentials

pub mod config;
pub mod error;
pub mod federation;
pub mod flow;
pub mod guard;
pub mod notify;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{AuthConfig, ConfigError, CookieConfig, IdentityConfig, RoutesConfig};
pub use error::{AuthError, ErrorCategory, PersistenceError};
pub use federation::{
    CredentialExchange, IdentityProvider, PasswordGrantProvider, ProviderError, ProviderGrant,
    SignIn, classify_provider_code, classify_provider_error,
};
pub use flow::{Requester, RequesterHandle, SignInFlow, SignInOutcome};
pub use guard::{AccessGuard, GuardDecision, Guarded, SignInRedirect};
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use session::{Session, SessionReader, SessionState, SessionView};
pub use storage::{CookieJarStore, MemoryTokenStore, TokenStore};
pub use types::{Credentials, IdentityRecord, SessionToken};

/// Type alias for sign-in results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Builds the token store described by `config`.
///
/// A configured jar path yields a [`CookieJarStore`]; otherwise the token
/// lives in memory for the lifetime of the process.
#[must_use]
pub fn token_store_from_config(config: &CookieConfig) -> std::sync::Arc<dyn TokenStore> {
    match &config.jar_path {
        Some(path) => std::sync::Arc::new(
            CookieJarStore::new(path)
                .with_cookie_name(config.name.clone())
                .with_cookie_path(config.path.clone()),
        ),
        None => std::sync::Arc::new(MemoryTokenStore::new()),
    }
}
