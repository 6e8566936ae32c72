//! Session data types.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Session Token
// =============================================================================

/// Opaque credential issued by the identity provider.
///
/// The token is passed through untouched; nothing in this crate decodes it.
/// `Debug` and `Display` print a redacted preview so tokens do not end up
/// in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string.
    ///
    /// Returns `None` for an empty (or all-whitespace) value, which the
    /// session treats the same as "no token".
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the raw string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Short preview for display: first and last 6 characters.
    #[must_use]
    pub fn preview(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 16 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl TryFrom<String> for SessionToken {
    type Error = &'static str;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or("session token must not be empty")
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&self.preview()).finish()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}

// =============================================================================
// Identity Record
// =============================================================================

/// Identity returned by a successful credential exchange.
///
/// Not cached anywhere; it lives as long as the caller keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Provider-assigned unique user identifier.
    pub user_id: String,

    /// Email the provider has on file, if it returned one.
    pub email: Option<String>,

    /// Raw identity-provider token, as issued.
    pub raw_token: SessionToken,

    /// Refresh token, for providers that issue one.
    pub refresh_token: Option<String>,

    /// Lifetime of `raw_token` in seconds, when reported.
    pub expires_in: Option<u64>,
}

// =============================================================================
// Credentials
// =============================================================================

/// Email and password submitted by the sign-in form.
///
/// No format validation happens here; that belongs to the form layer.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// The submitted email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The submitted password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
