//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into consistent JSON responses and status codes.
//! Internal errors are redacted on the wire; full detail stays in the logs.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::PaymentFailed => StatusCode::PAYMENT_REQUIRED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(err: &Error) -> Error {
    if matches!(err.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = err.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        err.clone()
    }
}

/// Seconds a throttled client should wait, read back from error details.
fn retry_after_seconds(err: &Error) -> Option<i64> {
    err.details()?.get("retryAfterSeconds")?.as_i64()
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if matches!(self.code(), ErrorCode::TooManyRequests) {
            if let Some(seconds) = retry_after_seconds(self) {
                builder.insert_header(("retry-after", seconds.to_string()));
            }
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("nope"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case(Error::too_many_requests("slow down"), StatusCode::TOO_MANY_REQUESTS)]
    #[case(Error::payment_failed("declined"), StatusCode::PAYMENT_REQUIRED)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes_follow_the_taxonomy(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted_on_the_wire() {
        let error = Error::internal("connection string was postgres://secret")
            .with_details(json!({ "dsn": "postgres://secret" }));
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body reads");
        let value: Value = serde_json::from_slice(&bytes).expect("error payload");

        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("Internal server error")
        );
        assert!(value.get("details").is_none());
    }

    #[actix_web::test]
    async fn rate_limit_errors_carry_a_retry_after_header() {
        let error = Error::too_many_requests("newsletter signup limit reached")
            .with_details(json!({ "retryAfterSeconds": 240, "resetAt": "2026-01-01T00:04:00Z" }));
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let header = response
            .headers()
            .get("retry-after")
            .expect("retry-after header")
            .to_str()
            .expect("header is ascii");
        assert_eq!(header, "240");
    }

    #[actix_web::test]
    async fn client_errors_keep_their_details() {
        let error = Error::invalid_request("bad").with_details(json!({ "field": "email" }));
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body reads");
        let value: Value = serde_json::from_slice(&bytes).expect("error payload");

        assert_eq!(
            value
                .get("details")
                .and_then(|details| details.get("field"))
                .and_then(Value::as_str),
            Some("email")
        );
    }
}
