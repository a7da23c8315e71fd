//! Signup, login, and session-bound profile endpoints.
//!
//! ```text
//! POST /api/v1/auth/signup {"displayName":"Asha","email":"a@example.org","password":"..."}
//! POST /api/v1/auth/login  {"email":"a@example.org","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{LoginRequest, SignupRequest, UserPersistenceError};
use crate::domain::{Error, User, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/auth/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupDto {
    /// Name shown on receipts and greetings.
    pub display_name: String,
    /// Contact email; must be unique.
    pub email: String,
    /// Optional contact phone; must be unique when given.
    #[serde(default)]
    pub phone: Option<String>,
    /// Plaintext password, hashed server-side.
    pub password: String,
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    /// Email the account was registered with.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Public view of an account; never carries credential material.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// Stable account identifier.
    pub id: Uuid,
    /// Name shown on receipts and greetings.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Access level.
    pub role: UserRole,
    /// Whether the email address has been verified.
    pub email_verified: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            email: user.email.into(),
            role: user.role,
            email_verified: user.email_verified,
        }
    }
}

/// Create an account and establish a session for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupDto,
    tags = ["auth"],
    security([]),
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or phone already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupDto>,
) -> ApiResult<HttpResponse> {
    let dto = payload.into_inner();
    let user = state
        .auth
        .signup(SignupRequest {
            display_name: dto.display_name,
            email: dto.email,
            phone: dto.phone,
            password: dto.password,
        })
        .await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Created().json(UserDto::from(user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginDto,
    tags = ["auth"],
    security([]),
    responses(
        (status = 200, description = "Login success", body = UserDto,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginDto>,
) -> ApiResult<HttpResponse> {
    let dto = payload.into_inner();
    let user = state
        .auth
        .login(LoginRequest {
            email: dto.email,
            password: dto.password,
        })
        .await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().json(UserDto::from(user)))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tags = ["auth"],
    responses(
        (status = 204, description = "Session cleared")
    )
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

fn map_user_lookup_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

/// Return the account bound to the current session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tags = ["auth"],
    responses(
        (status = 200, description = "Current account", body = UserDto),
        (status = 401, description = "Not logged in", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserDto>> {
    let user_id = session.require_user_id()?;
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(map_user_lookup_error)?
        // The session outlived the account; treat it as logged out.
        .ok_or_else(|| Error::unauthorized("login required"))?;
    Ok(web::Json(UserDto::from(user)))
}
