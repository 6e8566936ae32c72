//! Sign-in and session error types.
//!
//! [`AuthError`] is the closed taxonomy callers match on after a credential
//! exchange. Provider-specific codes never leak past
//! [`crate::federation::exchange`]; they are classified into one of these kinds.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors returned by a credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No account exists for the submitted email.
    #[error("User not found")]
    UserNotFound,

    /// The account exists but the password does not match.
    #[error("Wrong password")]
    WrongPassword,

    /// The provider rejected the credentials without saying which part was wrong.
    #[error("Invalid credential")]
    InvalidCredential,

    /// Too many failed attempts; the provider is throttling this account or client.
    #[error("Too many attempts")]
    RateLimited,

    /// Any provider failure without a dedicated kind, including transport errors.
    #[error("Sign-in failed: {message}")]
    Unknown {
        /// Provider or transport message.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unknown` error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns `true` if the submitted credentials were at fault.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential
        )
    }

    /// Returns `true` if re-submitting the same credentials later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Unknown { .. })
    }

    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential => {
                ErrorCategory::Credentials
            }
            Self::RateLimited => ErrorCategory::Throttling,
            Self::Unknown { .. } => ErrorCategory::Provider,
        }
    }

    /// Message suitable for the toast surface.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UserNotFound => "No account found for this email address.".to_string(),
            Self::WrongPassword => "The password you entered is incorrect.".to_string(),
            Self::InvalidCredential => "The email or password is incorrect.".to_string(),
            Self::RateLimited => {
                "Too many sign-in attempts. Please wait a moment and try again.".to_string()
            }
            Self::Unknown { message } => format!("Sign-in failed: {message}"),
        }
    }
}

/// Categories of sign-in errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The submitted email or password was rejected.
    Credentials,
    /// The provider is throttling requests.
    Throttling,
    /// The provider or the transport failed.
    Provider,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credentials => write!(f, "credentials"),
            Self::Throttling => write!(f, "throttling"),
            Self::Provider => write!(f, "provider"),
        }
    }
}

/// A durable token store write or read failed.
///
/// Non-fatal for the session: the in-memory state is still updated, but the
/// caller is told that a reload will not see the change.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The cookie jar could not be read or written.
    #[error("Cookie jar I/O failed at {path}: {source}")]
    Io {
        /// Location of the jar file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The jar file exists but a line could not be parsed as a cookie.
    #[error("Corrupt cookie jar at {path}: {message}")]
    Corrupt {
        /// Location of the jar file.
        path: PathBuf,
        /// Parse failure description.
        message: String,
    },
}

impl PersistenceError {
    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new `Corrupt` error.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found");
        assert_eq!(AuthError::WrongPassword.to_string(), "Wrong password");
        assert_eq!(
            AuthError::unknown("OPERATION_NOT_ALLOWED").to_string(),
            "Sign-in failed: OPERATION_NOT_ALLOWED"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::UserNotFound.is_credential_error());
        assert!(AuthError::InvalidCredential.is_credential_error());
        assert!(!AuthError::RateLimited.is_credential_error());

        assert!(AuthError::RateLimited.is_retryable());
        assert!(AuthError::unknown("network").is_retryable());
        assert!(!AuthError::WrongPassword.is_retryable());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::WrongPassword.category(),
            ErrorCategory::Credentials
        );
        assert_eq!(AuthError::RateLimited.category(), ErrorCategory::Throttling);
        assert_eq!(
            AuthError::unknown("x").category(),
            ErrorCategory::Provider
        );
        assert_eq!(ErrorCategory::Credentials.to_string(), "credentials");
    }

    #[test]
    fn test_user_message_carries_unknown_detail() {
        let msg = AuthError::unknown("USER_DISABLED").user_message();
        assert!(msg.contains("USER_DISABLED"));
        assert!(!AuthError::UserNotFound.user_message().is_empty());
    }

    #[test]
    fn test_persistence_error_display() {
        let err = PersistenceError::corrupt("/tmp/jar", "bad line");
        assert_eq!(err.to_string(), "Corrupt cookie jar at /tmp/jar: bad line");
    }
}
