//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use std::sync::Arc;

use super::state::HttpState;
use crate::domain::ports::{FixtureLoginService, MockLendingCommand, MockLendingQuery};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Log in with the fixture account and return the session cookie.
///
/// The app under test must mount `users::login` under `/api/v1`.
pub async fn login_and_get_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(serde_json::json!({"username": "admin", "password": "password"}))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "login should succeed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// HTTP state wired to the fixture login and the given lending mocks.
pub fn http_state(lending: MockLendingCommand, lending_query: MockLendingQuery) -> HttpState {
    HttpState::new(
        Arc::new(FixtureLoginService),
        Arc::new(lending),
        Arc::new(lending_query),
    )
}
