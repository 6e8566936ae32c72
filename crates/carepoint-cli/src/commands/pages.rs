use anyhow::Result;
use carepoint_auth::{AccessGuard, Guarded, RoutesConfig, SessionToken, SessionView};
use colored::Colorize;

use crate::app::App;
use crate::output::print_redirect;

/// A page the booking client can show.
pub struct Page {
    pub path: String,
    pub title: &'static str,
    pub protected: bool,
}

// (path, title, protected)
const CONTENT_PAGES: &[(&str, &str, bool)] = &[
    ("/", "Home", false),
    ("/departments", "Departments", false),
    ("/appointments", "My appointments", true),
    ("/profile", "Profile", true),
];

/// Known pages, with the sign-in entry placed at the configured route.
pub struct PageCatalog {
    pages: Vec<Page>,
}

impl PageCatalog {
    pub fn new(routes: &RoutesConfig) -> Self {
        let mut pages: Vec<Page> = CONTENT_PAGES
            .iter()
            .filter(|(path, _, _)| *path != routes.sign_in)
            .map(|&(path, title, protected)| Page {
                path: path.to_string(),
                title,
                protected,
            })
            .collect();
        pages.push(Page {
            path: routes.sign_in.clone(),
            title: "Sign in",
            protected: false,
        });
        Self { pages }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn find(&self, page: &str) -> Option<&Page> {
        let path = page_path(page);
        self.pages.iter().find(|p| p.path == path)
    }
}

fn page_path(page: &str) -> &str {
    page.split(['?', '#']).next().unwrap_or(page)
}

/// Where to go after a successful sign-in: the requested page, unless it is
/// missing or the sign-in page itself.
pub fn landing_page<'a>(routes: &'a RoutesConfig, next: Option<&'a str>) -> &'a str {
    match next {
        Some(page) if page.starts_with('/') && page_path(page) != routes.sign_in => page,
        _ => routes.after_sign_in.as_str(),
    }
}

fn render(page: &Page, token: Option<&SessionToken>) -> String {
    match token {
        Some(token) => format!("{} (session {})", page.title, token.preview()),
        None => page.title.to_string(),
    }
}

/// Renders `page`, routing protected pages through the guard.
pub fn open_page(
    catalog: &PageCatalog,
    guard: &AccessGuard,
    session: &impl SessionView,
    page: &str,
) -> Result<Guarded<String>> {
    let Some(entry) = catalog.find(page) else {
        anyhow::bail!("Unknown page: {page}. Run `carepoint pages` to list pages");
    };
    if !entry.protected {
        return Ok(Guarded::Content(render(entry, session.token().as_ref())));
    }
    Ok(guard.render_page(session, page, |token| render(entry, Some(token))))
}

pub fn open(app: &App, page: &str) -> Result<()> {
    match open_page(&app.pages, &app.guard, &app.session.reader(), page)? {
        Guarded::Content(body) => println!("{body}"),
        Guarded::Redirect(to) => {
            println!("Sign in required.");
            print_redirect(&to.location());
            let next = to
                .return_to()
                .map(|page| format!(" --next '{page}'"))
                .unwrap_or_default();
            println!("Run `carepoint sign-in --email <EMAIL>{next}` to continue.");
        }
    }
    Ok(())
}

pub fn list(app: &App) {
    for page in app.pages.pages() {
        let access = if page.protected {
            "protected".yellow()
        } else {
            "public".green()
        };
        println!("{:<16} {:<18} {}", page.path.cyan(), page.title, access);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepoint_auth::SessionState;

    fn signed_in() -> SessionState {
        SessionState::new(SessionToken::new("abcdefghijklmnopqrstuvwxyz"))
    }

    fn routes(sign_in: &str) -> RoutesConfig {
        RoutesConfig {
            sign_in: sign_in.to_string(),
            ..RoutesConfig::default()
        }
    }

    #[test]
    fn public_page_renders_without_session() {
        let catalog = PageCatalog::new(&RoutesConfig::default());
        let state = SessionState::new(None);
        let page = open_page(&catalog, &AccessGuard::default(), &state, "/departments").unwrap();
        assert_eq!(page, Guarded::Content("Departments".to_string()));
    }

    #[test]
    fn protected_page_redirects_with_return_target() {
        let catalog = PageCatalog::new(&RoutesConfig::default());
        let state = SessionState::new(None);
        let page = open_page(
            &catalog,
            &AccessGuard::default(),
            &state,
            "/appointments?day=mon",
        )
        .unwrap();
        let Guarded::Redirect(to) = page else {
            panic!("expected redirect");
        };
        assert_eq!(to.location(), "/signin?next=%2Fappointments%3Fday%3Dmon");
        assert_eq!(to.return_to(), Some("/appointments?day=mon"));
    }

    #[test]
    fn protected_page_renders_with_session() {
        let catalog = PageCatalog::new(&RoutesConfig::default());
        let page = open_page(&catalog, &AccessGuard::default(), &signed_in(), "/profile").unwrap();
        assert_eq!(
            page.content().as_deref(),
            Some("Profile (session abcdef...uvwxyz)")
        );
    }

    #[test]
    fn unknown_page_is_an_error() {
        let catalog = PageCatalog::new(&RoutesConfig::default());
        let state = SessionState::new(None);
        assert!(open_page(&catalog, &AccessGuard::default(), &state, "/billing").is_err());
    }

    #[test]
    fn redirect_target_is_served_for_custom_sign_in_route() {
        let routes = routes("/login");
        let catalog = PageCatalog::new(&routes);
        let guard = AccessGuard::from_routes(&routes);
        let state = SessionState::new(None);

        let Guarded::Redirect(to) = open_page(&catalog, &guard, &state, "/appointments").unwrap()
        else {
            panic!("expected redirect");
        };
        assert_eq!(to.location(), "/login?next=%2Fappointments");

        let followed = open_page(&catalog, &guard, &state, &to.location()).unwrap();
        assert_eq!(followed, Guarded::Content("Sign in".to_string()));
        assert!(catalog.find("/signin").is_none());
    }

    #[test]
    fn landing_page_prefers_next_then_falls_back() {
        let routes = RoutesConfig {
            after_sign_in: "/departments".to_string(),
            ..RoutesConfig::default()
        };
        assert_eq!(landing_page(&routes, Some("/appointments")), "/appointments");
        assert_eq!(landing_page(&routes, None), "/departments");
        assert_eq!(landing_page(&routes, Some("/signin?next=%2F")), "/departments");
        assert_eq!(landing_page(&routes, Some("appointments")), "/departments");
    }

    #[test]
    fn return_target_opens_after_sign_in() {
        let routes = RoutesConfig::default();
        let catalog = PageCatalog::new(&routes);
        let guard = AccessGuard::from_routes(&routes);
        let state = SessionState::new(None);

        let Guarded::Redirect(to) = open_page(&catalog, &guard, &state, "/profile").unwrap() else {
            panic!("expected redirect");
        };

        state.set_token(SessionToken::new("abcdefghijklmnopqrstuvwxyz"));
        let target = landing_page(&routes, to.return_to());
        let page = open_page(&catalog, &guard, &state, target).unwrap();
        assert_eq!(
            page.content().as_deref(),
            Some("Profile (session abcdef...uvwxyz)")
        );
    }
}
