//! CSRF token issuance and the guard applied to form submissions.
//!
//! ```text
//! GET /api/v1/csrf-token
//! ```

use actix_web::{HttpRequest, get, web};
use chrono::Duration;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Header form submissions must carry the token in.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// How long an issued token stays valid.
#[must_use]
pub fn token_max_age() -> Duration {
    Duration::minutes(30)
}

/// Response payload for `GET /api/v1/csrf-token`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    /// Opaque token to echo back in the `x-csrf-token` header.
    pub csrf_token: String,
    /// Seconds until the token expires.
    pub expires_in_seconds: i64,
}

/// Issue a fresh CSRF token.
#[utoipa::path(
    get,
    path = "/api/v1/csrf-token",
    tags = ["forms"],
    security([]),
    responses(
        (status = 200, description = "Fresh token", body = CsrfTokenResponse)
    )
)]
#[get("/csrf-token")]
pub async fn csrf_token(state: web::Data<HttpState>) -> ApiResult<web::Json<CsrfTokenResponse>> {
    Ok(web::Json(CsrfTokenResponse {
        csrf_token: state.csrf.generate(),
        expires_in_seconds: token_max_age().num_seconds(),
    }))
}

/// Reject the request unless it carries a valid CSRF token header.
pub fn require_csrf(state: &HttpState, req: &HttpRequest) -> Result<(), Error> {
    let token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if token.is_empty() || !state.csrf.validate(token, token_max_age()) {
        return Err(Error::forbidden("missing or invalid CSRF token")
            .with_details(json!({ "header": CSRF_HEADER })));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_state;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn issues_a_token_that_validates() {
        let handles = test_state();
        let app = test::init_service(
            App::new()
                .app_data(handles.state.clone())
                .service(web::scope("/api/v1").service(csrf_token)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/csrf-token").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = test::read_body_json(res).await;
        let token = value
            .get("csrfToken")
            .and_then(Value::as_str)
            .expect("token in payload");
        assert!(handles.state.csrf.validate(token, token_max_age()));
        assert_eq!(
            value.get("expiresInSeconds").and_then(Value::as_i64),
            Some(1800)
        );
    }

    #[actix_web::test]
    async fn require_csrf_rejects_missing_and_garbage_tokens() {
        let handles = test_state();
        let bare = test::TestRequest::default().to_http_request();
        assert!(require_csrf(&handles.state, &bare).is_err());

        let garbage = test::TestRequest::default()
            .insert_header((CSRF_HEADER, "not.a.token"))
            .to_http_request();
        assert!(require_csrf(&handles.state, &garbage).is_err());
    }

    #[actix_web::test]
    async fn require_csrf_accepts_a_fresh_token() {
        let handles = test_state();
        let token = handles.state.csrf.generate();
        let req = test::TestRequest::default()
            .insert_header((CSRF_HEADER, token))
            .to_http_request();
        assert!(require_csrf(&handles.state, &req).is_ok());
    }
}
