//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{LendingBackend, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use lending::Trace;
#[cfg(debug_assertions)]
use lending::doc::ApiDoc;
use lending::inbound::http::books::{borrow_book, get_book, list_book_reservations, reserve_book};
use lending::inbound::http::borrows::{borrow_history, extend_borrow, list_borrows, return_book};
use lending::inbound::http::health::{HealthState, live, ready};
use lending::inbound::http::notifications::{dismiss_notification, list_notifications};
use lending::inbound::http::reservations::{cancel_reservation, list_reservations};
use lending::inbound::http::state::HttpState;
use lending::inbound::http::users::{login, logout};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(get_book)
        .service(borrow_book)
        .service(reserve_book)
        .service(list_book_reservations)
        .service(list_borrows)
        .service(return_book)
        .service(extend_borrow)
        .service(borrow_history)
        .service(list_reservations)
        .service(cancel_reservation)
        .service(list_notifications)
        .service(dismiss_notification);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The server is marked ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(
        &config.backend,
        config.loan_policy,
        config.login.clone(),
    ));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        backend: _,
        loan_policy: _,
        login: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
