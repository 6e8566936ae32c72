use std::sync::Arc;

use anyhow::{Context, Result};
use carepoint_auth::{
    AccessGuard, AuthConfig, CredentialExchange, PasswordGrantProvider, Session,
    token_store_from_config,
};

use crate::commands::pages::PageCatalog;
use crate::output::TerminalToasts;

/// Everything one CLI invocation shares: the restored session, the page
/// catalog and the guard in front of protected pages.
pub struct App {
    pub session: Session,
    pub guard: AccessGuard,
    pub pages: PageCatalog,
    config: AuthConfig,
}

impl App {
    pub fn from_config(config: AuthConfig) -> Self {
        let session = Session::restore(token_store_from_config(&config.cookie));
        let guard = AccessGuard::from_routes(&config.routes);
        let pages = PageCatalog::new(&config.routes);
        Self {
            session,
            guard,
            pages,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Credential exchange against the configured identity provider.
    pub fn exchange(&self) -> Result<CredentialExchange> {
        self.config
            .validate()
            .context("Configuration is incomplete; see `carepoint config show`")?;
        let provider = PasswordGrantProvider::from_config(&self.config.identity)?;
        Ok(CredentialExchange::new(
            Arc::new(provider),
            Arc::new(TerminalToasts),
        ))
    }
}
