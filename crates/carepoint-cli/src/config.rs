use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carepoint_auth::AuthConfig;

pub type ConfigFile = BTreeMap<String, AuthConfig>;

/// `~/.carepoint`, or any directory laid out the same way.
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn home() -> Result<Self> {
        let root = dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".carepoint");
        Ok(Self { root })
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn default_jar_path(&self, profile: &str) -> PathBuf {
        self.root.join(format!("cookies.{profile}.txt"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_all(&self) -> Result<ConfigFile> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(ConfigFile::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Profile as stored, with the cookie jar defaulted into this directory.
    pub fn load_profile(&self, profile: &str) -> Result<AuthConfig> {
        let mut config = self.load_all()?.remove(profile).unwrap_or_default();
        if config.cookie.jar_path.is_none() {
            config.cookie.jar_path = Some(self.default_jar_path(profile));
        }
        Ok(config)
    }

    pub fn save_profile(&self, profile: &str, config: &AuthConfig) -> Result<()> {
        let mut all = self.load_all()?;
        all.insert(profile.to_string(), config.clone());
        fs::create_dir_all(&self.root)?;
        let content = toml::to_string_pretty(&all)?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }
}

/// Applies command-line overrides on top of the stored profile.
pub fn apply_overrides(config: &mut AuthConfig, api_key: Option<&str>, idp_url: Option<&str>) {
    if let Some(key) = api_key {
        config.identity.api_key = key.to_string();
    }
    if let Some(url) = idp_url {
        config.identity.endpoint = url.to_string();
        // Emulators run on plain http.
        if url.starts_with("http://") {
            config.identity.allow_http = true;
        }
    }
}

pub fn set_key(config: &mut AuthConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "endpoint" => config.identity.endpoint = value.to_string(),
        "api_key" => config.identity.api_key = value.to_string(),
        "allow_http" => {
            config.identity.allow_http = value
                .parse()
                .with_context(|| format!("allow_http must be true or false, got '{value}'"))?;
        }
        "timeout" => {
            config.identity.request_timeout =
                humantime::parse_duration(value).with_context(|| {
                    format!("timeout must be a duration like 30s or 1m, got '{value}'")
                })?;
        }
        "cookie_name" => config.cookie.name = value.to_string(),
        "jar_path" => config.cookie.jar_path = Some(PathBuf::from(value)),
        "sign_in" => config.routes.sign_in = value.to_string(),
        "after_sign_in" => config.routes.after_sign_in = value.to_string(),
        other => anyhow::bail!(
            "Unknown config key: {other}. Valid keys: endpoint, api_key, allow_http, timeout, cookie_name, jar_path, sign_in, after_sign_in"
        ),
    }
    Ok(())
}
