//! Access guard for protected pages.
//!
//! The guard looks at the session once per render and either lets the
//! protected content through or produces a redirect to the sign-in entry
//! point. It never contacts the identity provider: a present token is
//! trusted until a guarded action fails (see [`crate::Session::invalidate`]).
//!
//! # Example
//!
//! ```ignore
//! use carepoint_auth::{AccessGuard, Guarded};
//!
//! let guard = AccessGuard::new("/signin");
//! match guard.render(&session.reader(), |_token| render_appointments()) {
//!     Guarded::Content(html) => show(html),
//!     Guarded::Redirect(to) => navigate(to.location()),
//! }
//! ```

use std::fmt;

use url::form_urlencoded;

use crate::config::RoutesConfig;
use crate::session::SessionView;
use crate::types::SessionToken;

/// Query parameter carrying the page to return to after sign-in.
pub const RETURN_TO_PARAM: &str = "next";

/// Navigation to the sign-in entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRedirect {
    sign_in_path: String,
    return_to: Option<String>,
}

impl SignInRedirect {
    /// The sign-in path without query.
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// The protected page that triggered the redirect, if known.
    #[must_use]
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Full navigation target, e.g. `/signin?next=%2Fappointments`.
    #[must_use]
    pub fn location(&self) -> String {
        match &self.return_to {
            Some(page) => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_TO_PARAM, page)
                    .finish();
                format!("{}?{query}", self.sign_in_path)
            }
            None => self.sign_in_path.clone(),
        }
    }
}

impl fmt::Display for SignInRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Outcome of evaluating the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the protected content with this token.
    Render(SessionToken),
    /// Navigate to sign-in instead.
    Redirect(SignInRedirect),
}

/// Protected content or the redirect that replaced it. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// The protected content was rendered.
    Content(T),
    /// The content was not rendered.
    Redirect(SignInRedirect),
}

impl<T> Guarded<T> {
    /// Returns the content, if rendered.
    pub fn content(self) -> Option<T> {
        match self {
            Self::Content(c) => Some(c),
            Self::Redirect(_) => None,
        }
    }

    /// Returns `true` if the guard redirected.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Decision gate for protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    sign_in_path: String,
}

impl AccessGuard {
    /// Creates a guard redirecting to `sign_in_path`.
    #[must_use]
    pub fn new(sign_in_path: impl Into<String>) -> Self {
        Self {
            sign_in_path: sign_in_path.into(),
        }
    }

    /// Creates a guard from the route configuration.
    #[must_use]
    pub fn from_routes(routes: &RoutesConfig) -> Self {
        Self::new(routes.sign_in.clone())
    }

    /// Sign-in entry point.
    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Evaluates the session.
    #[must_use]
    pub fn evaluate(&self, session: &impl SessionView) -> GuardDecision {
        self.decide(session, None)
    }

    /// Evaluates the session for a specific page, remembering the page so the
    /// sign-in screen can send the user back to it.
    #[must_use]
    pub fn evaluate_page(&self, session: &impl SessionView, page: &str) -> GuardDecision {
        self.decide(session, Some(page))
    }

    /// Renders `content` if the session holds a token.
    pub fn render<T>(
        &self,
        session: &impl SessionView,
        content: impl FnOnce(&SessionToken) -> T,
    ) -> Guarded<T> {
        match self.evaluate(session) {
            GuardDecision::Render(token) => Guarded::Content(content(&token)),
            GuardDecision::Redirect(to) => Guarded::Redirect(to),
        }
    }

    /// Like [`render`](Self::render), recording `page` in the redirect.
    pub fn render_page<T>(
        &self,
        session: &impl SessionView,
        page: &str,
        content: impl FnOnce(&SessionToken) -> T,
    ) -> Guarded<T> {
        match self.evaluate_page(session, page) {
            GuardDecision::Render(token) => Guarded::Content(content(&token)),
            GuardDecision::Redirect(to) => Guarded::Redirect(to),
        }
    }

    fn decide(&self, session: &impl SessionView, page: Option<&str>) -> GuardDecision {
        match session.token() {
            Some(token) => {
                tracing::debug!(page, "Guard: session present, rendering");
                GuardDecision::Render(token)
            }
            None => {
                tracing::debug!(page, sign_in = %self.sign_in_path, "Guard: no session, redirecting");
                GuardDecision::Redirect(SignInRedirect {
                    sign_in_path: self.sign_in_path.clone(),
                    // Bouncing back to the sign-in page itself would loop.
                    return_to: page
                        .filter(|p| *p != self.sign_in_path)
                        .map(str::to_string),
                })
            }
        }
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::from_routes(&RoutesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn token(raw: &str) -> SessionToken {
        SessionToken::new(raw).unwrap()
    }

    #[test]
    fn test_present_token_renders() {
        let state = SessionState::new(Some(token("t1")));
        let guard = AccessGuard::default();

        assert_eq!(guard.evaluate(&state), GuardDecision::Render(token("t1")));
        let rendered = guard.render(&state, |t| format!("hello {}", t.as_str()));
        assert_eq!(rendered, Guarded::Content("hello t1".to_string()));
    }

    #[test]
    fn test_absent_token_redirects_without_rendering() {
        let state = SessionState::new(None);
        let guard = AccessGuard::new("/signin");

        let mut rendered = false;
        let outcome = guard.render(&state, |_| rendered = true);

        assert!(!rendered);
        assert!(outcome.is_redirect());
        match outcome {
            Guarded::Redirect(to) => assert_eq!(to.location(), "/signin"),
            Guarded::Content(()) => panic!("content rendered without a session"),
        }
    }

    #[test]
    fn test_page_redirect_carries_return_target() {
        let state = SessionState::new(None);
        let guard = AccessGuard::new("/signin");

        let GuardDecision::Redirect(to) = guard.evaluate_page(&state, "/appointments?day=mon")
        else {
            panic!("expected redirect");
        };
        assert_eq!(to.return_to(), Some("/appointments?day=mon"));
        assert_eq!(
            to.location(),
            "/signin?next=%2Fappointments%3Fday%3Dmon"
        );
    }

    #[test]
    fn test_sign_in_page_does_not_return_to_itself() {
        let state = SessionState::new(None);
        let guard = AccessGuard::new("/signin");

        let GuardDecision::Redirect(to) = guard.evaluate_page(&state, "/signin") else {
            panic!("expected redirect");
        };
        assert_eq!(to.return_to(), None);
        assert_eq!(to.to_string(), "/signin");
    }

    #[test]
    fn test_guard_follows_state_changes() {
        let state = SessionState::new(None);
        let reader = state.reader();
        let guard = AccessGuard::default();

        assert!(guard.render(&reader, |_| ()).is_redirect());
        state.set_token(Some(token("t1")));
        assert!(!guard.render(&reader, |_| ()).is_redirect());
        state.set_token(None);
        assert!(guard.render(&reader, |_| ()).is_redirect());
    }

    #[test]
    fn test_from_routes() {
        let routes = RoutesConfig {
            sign_in: "/login".to_string(),
            ..RoutesConfig::default()
        };
        assert_eq!(AccessGuard::from_routes(&routes).sign_in_path(), "/login");
    }
}
