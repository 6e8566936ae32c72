//! Email/password grant over the provider's REST API.
//!
//! One `POST {endpoint}/v1/accounts:signInWithPassword?key={api_key}` per
//! exchange:
//!
//! ```text
//! request:  {"email": "...", "password": "...", "returnSecureToken": true}
//! success:  {"idToken": "...", "localId": "...", "email": "...",
//!            "refreshToken": "...", "expiresIn": "3600"}
//! failure:  {"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use super::provider::{IdentityProvider, ProviderError, ProviderGrant};
use crate::config::{ConfigError, IdentityConfig};

const SIGN_IN_PATH: [&str; 2] = ["v1", "accounts:signInWithPassword"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider reached over HTTPS with an API key.
#[derive(Debug, Clone)]
pub struct PasswordGrantProvider {
    sign_in_url: Url,
    http_client: reqwest::Client,
}

impl PasswordGrantProvider {
    /// Builds the provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the endpoint is unusable or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("identity.api_key".into()));
        }

        let mut sign_in_url = config.endpoint_url()?;
        sign_in_url
            .path_segments_mut()
            .map_err(|()| ConfigError::InvalidValue("identity.endpoint is not a base URL".into()))?
            .pop_if_empty()
            .extend(SIGN_IN_PATH);
        sign_in_url
            .query_pairs_mut()
            .append_pair("key", &config.api_key);

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue(format!("HTTP client: {e}")))?;

        Ok(Self {
            sign_in_url,
            http_client,
        })
    }

    /// Uses a custom HTTP client (connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    async fn rejection(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            // Messages look like "CODE" or "CODE : human readable detail".
            let (code, detail) = match envelope.error.message.split_once(" : ") {
                Some((code, detail)) => (code.trim().to_string(), detail.trim().to_string()),
                None => (envelope.error.message.trim().to_string(), String::new()),
            };
            return ProviderError::Rejected {
                code,
                message: detail,
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderError::rejected("TOO_MANY_ATTEMPTS_TRY_LATER", body);
        }

        ProviderError::Malformed(format!("HTTP {status}: {body}"))
    }
}

#[async_trait]
impl IdentityProvider for PasswordGrantProvider {
    fn name(&self) -> &str {
        "password-grant"
    }

    async fn exchange_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderGrant, ProviderError> {
        tracing::debug!(
            endpoint = %self.sign_in_url.path(),
            "Exchanging credentials with identity provider"
        );

        let response = self
            .http_client
            .post(self.sign_in_url.clone())
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body = response.text().await?;
        let parsed: SignInResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Malformed(format!("sign-in response: {e}")))?;

        let expires_in = match parsed.expires_in.as_deref() {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ProviderError::Malformed(format!("expiresIn is not a number: '{raw}'"))
            })?),
            None => None,
        };

        Ok(ProviderGrant {
            id_token: parsed.id_token,
            user_id: parsed.local_id,
            email: parsed.email,
            refresh_token: parsed.refresh_token,
            expires_in,
        })
    }
}
