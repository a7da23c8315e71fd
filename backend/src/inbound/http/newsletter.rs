//! Newsletter signup endpoint, rate limited per client.
//!
//! ```text
//! POST /api/v1/newsletter {"email":"reader@example.org"}
//! ```

use actix_web::{HttpRequest, HttpResponse, post, web};
use mockable::Clock as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::NewsletterPersistenceError;
use crate::domain::{EmailAddress, Error, RateLimitPolicy};
use crate::inbound::http::ApiResult;
use crate::inbound::http::client::client_key;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/newsletter`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignupDto {
    /// Address to subscribe.
    pub email: String,
}

/// Response body for a successful signup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignupResponse {
    /// Always true on the success path.
    pub subscribed: bool,
}

fn map_newsletter_persistence_error(err: NewsletterPersistenceError) -> Error {
    match err {
        NewsletterPersistenceError::Connection { message } => Error::service_unavailable(message),
        NewsletterPersistenceError::Query { message } => Error::internal(message),
        NewsletterPersistenceError::Duplicate => {
            Error::conflict("this email is already subscribed")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
    }
}

/// Subscribe an address to the newsletter.
///
/// Throttled to 3 requests per 5 minutes per client; the 429 response
/// carries the window reset time.
#[utoipa::path(
    post,
    path = "/api/v1/newsletter",
    request_body = NewsletterSignupDto,
    tags = ["forms"],
    security([]),
    responses(
        (status = 201, description = "Subscribed", body = NewsletterSignupResponse),
        (status = 400, description = "Invalid email", body = Error),
        (status = 409, description = "Already subscribed", body = Error),
        (status = 429, description = "Too many signups from this client", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    )
)]
#[post("/newsletter")]
pub async fn newsletter_signup(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<NewsletterSignupDto>,
) -> ApiResult<HttpResponse> {
    let key = client_key(&req);
    let decision = state.rate_limiter.check(&key, RateLimitPolicy::newsletter());
    if !decision.allowed {
        let now = state.clock.utc();
        return Err(
            Error::too_many_requests("newsletter signup limit reached").with_details(json!({
                "retryAfterSeconds": decision.retry_after_seconds(now),
                "resetAt": decision.reset_at.to_rfc3339(),
            })),
        );
    }

    let email = EmailAddress::new(&payload.email).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": err.code() }))
    })?;

    state
        .newsletter
        .subscribe(&email, state.clock.utc())
        .await
        .map_err(map_newsletter_persistence_error)?;

    Ok(HttpResponse::Created().json(NewsletterSignupResponse { subscribed: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_state;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    macro_rules! newsletter_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .service(web::scope("/api/v1").service(newsletter_signup)),
            )
            .await
        };
    }

    fn signup_request(email: &str, client: &str) -> actix_http::Request {
        test::TestRequest::post()
            .uri("/api/v1/newsletter")
            .insert_header(("x-forwarded-for", client))
            .set_json(json!({ "email": email }))
            .to_request()
    }

    #[actix_web::test]
    async fn subscribes_a_fresh_address() {
        let handles = test_state();
        let app = newsletter_app!(handles.state);

        let res = test::call_service(&app, signup_request("reader@example.org", "203.0.113.9"))
            .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(handles.newsletter.len(), 1);
    }

    #[actix_web::test]
    async fn duplicate_subscription_conflicts() {
        let handles = test_state();
        let app = newsletter_app!(handles.state);

        let first =
            test::call_service(&app, signup_request("reader@example.org", "203.0.113.9")).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second =
            test::call_service(&app, signup_request("Reader@Example.org", "203.0.113.10")).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(handles.newsletter.len(), 1);
    }

    #[actix_web::test]
    async fn fourth_request_from_one_client_is_throttled() {
        let handles = test_state();
        let app = newsletter_app!(handles.state);

        for n in 0..3 {
            let res = test::call_service(
                &app,
                signup_request(&format!("reader{n}@example.org"), "203.0.113.9"),
            )
            .await;
            assert_ne!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        }

        let fourth = test::call_service(
            &app,
            signup_request("reader3@example.org", "203.0.113.9"),
        )
        .await;
        assert_eq!(fourth.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(fourth.headers().contains_key("retry-after"));
        let value: Value = test::read_body_json(fourth).await;
        assert!(
            value
                .get("details")
                .and_then(|details| details.get("resetAt"))
                .is_some()
        );

        // A different client is unaffected.
        let other = test::call_service(
            &app,
            signup_request("other@example.org", "198.51.100.7"),
        )
        .await;
        assert_eq!(other.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn invalid_email_is_a_bad_request() {
        let handles = test_state();
        let app = newsletter_app!(handles.state);

        let res = test::call_service(&app, signup_request("not-an-email", "203.0.113.9")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(handles.newsletter.is_empty());
    }
}
