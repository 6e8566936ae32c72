//! Durable storage for the session token.
//!
//! - [`TokenStore`] - get/set/clear contract
//! - [`MemoryTokenStore`] - process-local store, for tests and ephemeral sessions
//! - [`CookieJarStore`] - cookie jar persisted to a file, survives restarts

pub mod cookie_jar;
pub mod token;

pub use cookie_jar::CookieJarStore;
pub use token::{MemoryTokenStore, TokenStore};
