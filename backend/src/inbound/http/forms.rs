//! Contact, volunteer, and feedback form intake.
//!
//! All three forms share one payload shape and one persistence path; they
//! differ only in the recorded [`MessageKind`]. Submissions must carry a
//! valid CSRF token in the `x-csrf-token` header.
//!
//! ```text
//! POST /api/v1/contact   {"name":"...","email":"...","message":"..."}
//! POST /api/v1/volunteer {"name":"...","email":"...","phone":"...","message":"..."}
//! POST /api/v1/feedback  {"name":"...","email":"...","subject":"...","message":"..."}
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use mockable::Clock as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::MessagePersistenceError;
use crate::domain::sanitize::{SanitizeError, sanitize_email, sanitize_phone, sanitize_text};
use crate::domain::{Error, MessageKind, NewMessage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csrf::require_csrf;
use crate::inbound::http::state::HttpState;

/// Longest accepted sender name.
const NAME_MAX: usize = 100;
/// Longest accepted subject line.
const SUBJECT_MAX: usize = 150;
/// Longest accepted message body.
const BODY_MAX: usize = 2_000;

/// Shared request body for the three public forms.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmissionDto {
    /// Sender's name.
    pub name: String,
    /// Sender's email.
    pub email: String,
    /// Optional sender phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Optional subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    pub message: String,
}

/// Response body: the stored message id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmissionResponse {
    /// Identifier of the stored submission.
    pub id: Uuid,
}

fn map_sanitize_error(err: &SanitizeError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

fn build_message(kind: MessageKind, dto: FormSubmissionDto) -> Result<NewMessage, Error> {
    let name =
        sanitize_text("name", &dto.name, NAME_MAX).map_err(|err| map_sanitize_error(&err))?;
    let email = sanitize_email(&dto.email).map_err(|err| map_sanitize_error(&err))?;
    let phone = dto
        .phone
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(sanitize_phone)
        .transpose()
        .map_err(|err| map_sanitize_error(&err))?;
    let subject = dto
        .subject
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| sanitize_text("subject", raw, SUBJECT_MAX))
        .transpose()
        .map_err(|err| map_sanitize_error(&err))?;
    let body = sanitize_text("message", &dto.message, BODY_MAX)
        .map_err(|err| map_sanitize_error(&err))?;

    Ok(NewMessage {
        kind,
        name,
        email,
        phone,
        subject,
        body,
    })
}

fn map_message_persistence_error(err: MessagePersistenceError) -> Error {
    match err {
        MessagePersistenceError::Connection { message } => Error::service_unavailable(message),
        MessagePersistenceError::Query { message } => Error::internal(message),
    }
}

async fn submit(
    state: &HttpState,
    req: &HttpRequest,
    kind: MessageKind,
    dto: FormSubmissionDto,
) -> Result<HttpResponse, Error> {
    require_csrf(state, req)?;
    let message = build_message(kind, dto)?;
    let stored = state
        .messages
        .create(&message, state.clock.utc())
        .await
        .map_err(map_message_persistence_error)?;
    Ok(HttpResponse::Created().json(FormSubmissionResponse { id: stored.id }))
}

/// Accept a contact form submission.
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = FormSubmissionDto,
    tags = ["forms"],
    security([]),
    responses(
        (status = 201, description = "Stored", body = FormSubmissionResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 403, description = "Missing or invalid CSRF token", body = Error)
    )
)]
#[post("/contact")]
pub async fn contact(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<FormSubmissionDto>,
) -> ApiResult<HttpResponse> {
    submit(&state, &req, MessageKind::Contact, payload.into_inner()).await
}

/// Accept a volunteer interest submission.
#[utoipa::path(
    post,
    path = "/api/v1/volunteer",
    request_body = FormSubmissionDto,
    tags = ["forms"],
    security([]),
    responses(
        (status = 201, description = "Stored", body = FormSubmissionResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 403, description = "Missing or invalid CSRF token", body = Error)
    )
)]
#[post("/volunteer")]
pub async fn volunteer(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<FormSubmissionDto>,
) -> ApiResult<HttpResponse> {
    submit(&state, &req, MessageKind::Volunteer, payload.into_inner()).await
}

/// Accept a feedback submission.
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = FormSubmissionDto,
    tags = ["forms"],
    security([]),
    responses(
        (status = 201, description = "Stored", body = FormSubmissionResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 403, description = "Missing or invalid CSRF token", body = Error)
    )
)]
#[post("/feedback")]
pub async fn feedback(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<FormSubmissionDto>,
) -> ApiResult<HttpResponse> {
    submit(&state, &req, MessageKind::Feedback, payload.into_inner()).await
}
