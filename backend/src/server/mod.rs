//! Server construction and middleware wiring.

pub mod config;
mod state_builders;

pub use config::AppConfig;
pub use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::causes::{get_cause, list_causes};
use backend::inbound::http::csrf::csrf_token;
use backend::inbound::http::events::{get_event, list_events};
use backend::inbound::http::forms::{contact, feedback, volunteer};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::newsletter::newsletter_signup;
use backend::inbound::http::payments::{create_donation, verify_payment};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{current_user, login, logout, signup};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Settings for constructing the HTTP server.
pub struct ServerConfig {
    /// Session cookie signing key.
    pub key: Key,
    /// Whether session cookies require HTTPS.
    pub cookie_secure: bool,
    /// SameSite policy for the session cookie.
    pub same_site: SameSite,
    /// Address to bind.
    pub bind_addr: std::net::SocketAddr,
}

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
        .service(create_donation)
        .service(verify_payment)
        .service(signup)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(list_causes)
        .service(get_cause)
        .service(list_events)
        .service(get_event)
        .service(newsletter_signup)
        .service(contact)
        .service(volunteer)
        .service(feedback)
        .service(csrf_token);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server over the prepared state.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
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
