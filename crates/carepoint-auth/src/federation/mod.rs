//! Credential exchange with the external identity provider.
//!
//! - [`provider`] - the capability contract the provider is accessed through
//! - [`password`] - HTTPS email/password grant against the provider's REST API
//! - [`exchange`] - classification of provider failures and user notices

pub mod exchange;
pub mod password;
pub mod provider;

pub use exchange::{CredentialExchange, SignIn, classify_provider_code, classify_provider_error};
pub use password::PasswordGrantProvider;
pub use provider::{IdentityProvider, ProviderError, ProviderGrant};
