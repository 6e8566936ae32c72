//! File-backed cookie jar.
//!
//! The jar is a plain text file with one `Set-Cookie` style line per cookie
//! (`token=abc; Path=/`). Only the configured cookie is owned by this store;
//! other cookies in the jar are preserved across writes.
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! jar, so a crash leaves either the old or the new jar, never a torn one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use cookie::Cookie;

use super::token::TokenStore;
use crate::error::PersistenceError;
use crate::types::SessionToken;

/// Default cookie name for the session token.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Token store backed by a cookie jar file.
#[derive(Debug)]
pub struct CookieJarStore {
    path: PathBuf,
    cookie_name: String,
    cookie_path: String,
    write_lock: Mutex<()>,
}

impl CookieJarStore {
    /// Creates a store for the jar at `path` using the default cookie name.
    ///
    /// The file is created lazily on the first `set`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// Overrides the cookie name.
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Overrides the cookie `Path` attribute.
    #[must_use]
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Location of the jar file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the cookie that holds the token.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn read_content(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(&self.path, e)),
        }
    }

    fn jar_lines(content: &str) -> impl Iterator<Item = &str> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
    }

    /// Strict read: any unparsable line is reported as corruption.
    fn read_jar(&self) -> Result<Vec<Cookie<'static>>, PersistenceError> {
        let Some(content) = self.read_content()? else {
            return Ok(Vec::new());
        };
        Self::jar_lines(&content)
            .map(|line| {
                Cookie::parse_encoded(line.to_owned())
                    .map_err(|e| PersistenceError::corrupt(&self.path, e.to_string()))
            })
            .collect()
    }

    /// Read for a rewrite: unparsable lines are logged and dropped so the
    /// next write repairs the jar.
    fn read_jar_for_write(&self) -> Result<(Vec<Cookie<'static>>, usize), PersistenceError> {
        let Some(content) = self.read_content()? else {
            return Ok((Vec::new(), 0));
        };
        let mut dropped = 0;
        let cookies: Vec<Cookie<'static>> = Self::jar_lines(&content)
            .filter_map(|line| match Cookie::parse_encoded(line.to_owned()) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::warn!(
                        jar = %self.path.display(),
                        error = %e,
                        "Dropping unparsable cookie jar line"
                    );
                    dropped += 1;
                    None
                }
            })
            .collect();
        Ok((cookies, dropped))
    }

    fn write_jar(&self, cookies: &[Cookie<'static>]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let mut body = String::new();
        for cookie in cookies {
            body.push_str(&cookie.encoded().to_string());
            body.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| PersistenceError::io(&self.path, e))
    }

    fn build_cookie(&self, token: &SessionToken) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token.as_str().to_owned()))
            .path(self.cookie_path.clone())
            .build()
    }
}

impl TokenStore for CookieJarStore {
    fn get(&self) -> Result<Option<SessionToken>, PersistenceError> {
        let jar = self.read_jar()?;
        Ok(jar
            .iter()
            .rev()
            .find(|c| c.name() == self.cookie_name)
            .and_then(|c| SessionToken::new(c.value())))
    }

    fn set(&self, token: &SessionToken) -> Result<(), PersistenceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (mut jar, _) = self.read_jar_for_write()?;
        jar.retain(|c| c.name() != self.cookie_name);
        jar.push(self.build_cookie(token));
        self.write_jar(&jar)?;

        tracing::debug!(
            jar = %self.path.display(),
            cookie = %self.cookie_name,
            "Session cookie stored"
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (mut jar, dropped) = self.read_jar_for_write()?;
        let before = jar.len();
        jar.retain(|c| c.name() != self.cookie_name);
        if jar.len() == before && dropped == 0 {
            return Ok(());
        }
        self.write_jar(&jar)?;

        tracing::debug!(
            jar = %self.path.display(),
            cookie = %self.cookie_name,
            "Session cookie cleared"
        );
        Ok(())
    }
}
