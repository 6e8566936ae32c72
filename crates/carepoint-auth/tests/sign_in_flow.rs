//! End-to-end sign-in against a mocked identity provider.

use std::sync::Arc;

use carepoint_auth::{
    AccessGuard, AuthError, ChannelNotifier, CookieJarStore, CredentialExchange, Credentials,
    GuardDecision, Guarded, IdentityConfig, NoticeLevel, PasswordGrantProvider, Requester, Session,
    SessionState, SessionToken, SessionView, SignInFlow, SignInOutcome, TokenStore,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";

async fn mount_account(server: &MockServer, email: &str, password: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .and(body_partial_json(json!({ "email": email, "password": password })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idToken": token,
            "localId": format!("uid-{email}"),
            "email": email,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        })))
        .mount(server)
        .await;
}

async fn mount_rejection(server: &MockServer, email: &str, code: &str) {
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .and(body_partial_json(json!({ "email": email })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": code }
        })))
        .mount(server)
        .await;
}

/// Provider with three accounts: two valid logins and one missing email.
async fn identity_provider() -> MockServer {
    let server = MockServer::start().await;
    mount_account(&server, "valid@x.com", "correct", "token-valid").await;
    mount_account(&server, "user@test.com", "hunter2", "token-user").await;
    mount_rejection(&server, "missing@x.com", "EMAIL_NOT_FOUND").await;
    // Lowest priority: anything else for valid@x.com is a wrong password.
    Mock::given(method("POST"))
        .and(path(SIGN_IN_PATH))
        .and(body_partial_json(json!({ "email": "valid@x.com" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_PASSWORD" }
        })))
        .with_priority(10)
        .mount(&server)
        .await;
    server
}

fn exchange_for(
    server: &MockServer,
) -> (
    CredentialExchange,
    tokio::sync::mpsc::UnboundedReceiver<carepoint_auth::Notice>,
) {
    let config = IdentityConfig {
        endpoint: format!("{}/", server.uri()),
        api_key: "test-key".to_string(),
        allow_http: true,
        ..IdentityConfig::default()
    };
    let provider = PasswordGrantProvider::from_config(&config).unwrap();
    let (notifier, rx) = ChannelNotifier::new();
    (
        CredentialExchange::new(Arc::new(provider), Arc::new(notifier)),
        rx,
    )
}

fn token(raw: &str) -> SessionToken {
    SessionToken::new(raw).unwrap()
}

#[test]
fn stored_token_is_restored_on_fresh_start() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("cookies.txt");

    CookieJarStore::new(&jar).set(&token("restored-token")).unwrap();

    let state = SessionState::restore(&CookieJarStore::new(&jar));
    assert_eq!(state.token(), Some(token("restored-token")));
}

#[test]
fn guard_renders_iff_token_present() {
    let guard = AccessGuard::default();
    for initial in [None, Some(token("t"))] {
        let state = SessionState::new(initial.clone());
        let mut rendered = false;
        let outcome = guard.render(&state, |_| rendered = true);

        match (initial.is_some(), outcome) {
            (true, Guarded::Content(())) => assert!(rendered),
            (false, Guarded::Redirect(to)) => {
                assert!(!rendered);
                assert_eq!(to.sign_in_path(), "/signin");
            }
            (present, other) => panic!("token present = {present}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn valid_credentials_return_a_token() {
    let server = identity_provider().await;
    let (exchange, mut notices) = exchange_for(&server);

    let sign_in = exchange
        .sign_in(&Credentials::new("valid@x.com", "correct"))
        .await
        .unwrap();

    assert!(!sign_in.token.as_str().is_empty());
    assert_eq!(sign_in.identity.user_id, "uid-valid@x.com");
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn unknown_email_is_user_not_found() {
    let server = identity_provider().await;
    let (exchange, mut notices) = exchange_for(&server);

    let err = exchange
        .sign_in(&Credentials::new("missing@x.com", "any"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::UserNotFound);
    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, AuthError::UserNotFound.user_message());
}

#[tokio::test]
async fn wrong_password_is_reported() {
    let server = identity_provider().await;
    let (exchange, _notices) = exchange_for(&server);

    let err = exchange
        .sign_in(&Credentials::new("valid@x.com", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::WrongPassword);
}

#[test]
fn cleared_session_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CookieJarStore::new(dir.path().join("cookies.txt")));
    store.set(&token("t1")).unwrap();
    let session = Session::restore(store.clone());
    assert!(session.is_authenticated());

    store.clear().unwrap();
    session.state().set_token(None);

    let decision = AccessGuard::default().evaluate_page(&session.reader(), "/appointments");
    assert!(matches!(decision, GuardDecision::Redirect(_)));
}

#[test]
fn setting_same_token_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CookieJarStore::new(dir.path().join("cookies.txt"));

    store.set(&token("same")).unwrap();
    store.set(&token("same")).unwrap();

    assert_eq!(store.get().unwrap(), Some(token("same")));
    let jar = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(jar.matches("token=").count(), 1);
}

#[tokio::test]
async fn sign_in_then_protected_page_shows_content() {
    let server = identity_provider().await;
    let (exchange, _notices) = exchange_for(&server);
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CookieJarStore::new(dir.path().join("cookies.txt")));
    let session = Session::restore(store.clone());
    let guard = AccessGuard::default();
    let reader = session.reader();

    assert!(guard.render_page(&reader, "/appointments", |_| ()).is_redirect());

    let requester = Requester::new();
    let outcome = SignInFlow::new(&exchange, &session)
        .run(
            &Credentials::new("user@test.com", "hunter2"),
            &requester.handle(),
        )
        .await
        .unwrap();

    let SignInOutcome::Committed {
        identity,
        persist_error,
    } = outcome
    else {
        panic!("sign-in was discarded");
    };
    assert!(persist_error.is_none());
    assert_eq!(identity.raw_token, token("token-user"));
    assert_eq!(reader.token(), Some(token("token-user")));

    let page = guard.render_page(&reader, "/appointments", |t| {
        format!("appointments for {}", t.as_str())
    });
    assert_eq!(
        page,
        Guarded::Content("appointments for token-user".to_string())
    );

    // A restart sees the same session.
    let restarted = Session::restore(Arc::new(CookieJarStore::new(store.path())));
    assert_eq!(restarted.token(), Some(token("token-user")));
}

#[tokio::test]
async fn failed_sign_in_leaves_session_untouched() {
    let server = identity_provider().await;
    let (exchange, _notices) = exchange_for(&server);
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CookieJarStore::new(dir.path().join("cookies.txt")));
    store.set(&token("previous")).unwrap();
    let session = Session::restore(store.clone());

    let requester = Requester::new();
    let err = SignInFlow::new(&exchange, &session)
        .run(
            &Credentials::new("valid@x.com", "wrong"),
            &requester.handle(),
        )
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::WrongPassword);
    assert_eq!(session.token(), Some(token("previous")));
    assert_eq!(store.get().unwrap(), Some(token("previous")));
}

#[test]
fn foreign_garbage_in_jar_does_not_block_commit_or_sign_out() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("cookies.txt");
    std::fs::write(&jar, "garbage-without-equals\n").unwrap();
    let session = Session::restore(Arc::new(CookieJarStore::new(&jar)));
    assert!(!session.is_authenticated());

    session.commit_token(Some(token("tok"))).unwrap();
    let restarted = Session::restore(Arc::new(CookieJarStore::new(&jar)));
    assert_eq!(restarted.token(), Some(token("tok")));

    session.sign_out().unwrap();
    assert_eq!(CookieJarStore::new(&jar).get().unwrap(), None);
}
