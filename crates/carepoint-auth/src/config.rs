//! Session and sign-in configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [identity]
//! endpoint = "https://identitytoolkit.googleapis.com/"
//! api_key = "AIza..."
//! request_timeout = "15s"
//!
//! [cookie]
//! name = "token"
//! jar_path = "/home/me/.carepoint/cookies.txt"
//!
//! [routes]
//! sign_in = "/signin"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity provider connection.
    pub identity: IdentityConfig,

    /// Token cookie settings.
    pub cookie: CookieConfig,

    /// Navigation targets.
    pub routes: RoutesConfig,
}

/// Identity provider connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the provider's REST API.
    pub endpoint: String,

    /// Public API key identifying this client to the provider.
    pub api_key: String,

    /// Timeout for a single credential exchange round trip.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Allow a plain `http://` endpoint (local emulators only).
    pub allow_http: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://identitytoolkit.googleapis.com/".to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(15),
            allow_http: false,
        }
    }
}

impl IdentityConfig {
    /// Parses and checks the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the URL does not parse, cannot
    /// carry a path, or uses plain HTTP without `allow_http`.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidValue(format!("identity.endpoint '{}': {e}", self.endpoint))
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(format!(
                "identity.endpoint '{}' is not a base URL",
                self.endpoint
            )));
        }
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::InvalidValue(
                    "identity.endpoint uses http; set identity.allow_http for emulators".into(),
                ));
            }
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "identity.endpoint has unsupported scheme '{other}'"
                )));
            }
        }
        Ok(url)
    }
}

/// Token cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name holding the token.
    pub name: String,

    /// Cookie `Path` attribute.
    pub path: String,

    /// Cookie jar file. `None` keeps the token in memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_path: Option<PathBuf>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: crate::storage::cookie_jar::DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            jar_path: None,
        }
    }
}

/// Navigation targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Sign-in entry point the guard redirects to.
    pub sign_in: String,

    /// Page shown after a successful sign-in.
    pub after_sign_in: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            sign_in: "/signin".to_string(),
            after_sign_in: "/".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is present but unusable.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required value is absent.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Checks the configuration for values that would fail at runtime.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("identity.api_key".into()));
        }
        self.identity.endpoint_url()?;
        if self.identity.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "identity.request_timeout must be greater than zero".into(),
            ));
        }

        if self.cookie.name.is_empty() || !self.cookie.name.chars().all(is_cookie_name_char) {
            return Err(ConfigError::InvalidValue(format!(
                "cookie.name '{}' is not a valid cookie name",
                self.cookie.name
            )));
        }
        if !self.cookie.path.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "cookie.path must start with '/'".into(),
            ));
        }

        for (key, route) in [
            ("routes.sign_in", &self.routes.sign_in),
            ("routes.after_sign_in", &self.routes.after_sign_in),
        ] {
            if !route.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "{key} must be an absolute path, got '{route}'"
                )));
            }
        }
        Ok(())
    }
}

fn is_cookie_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
