//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the shared response schemas,
//! plus the session-cookie security scheme. The generated specification
//! drives Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::causes::CauseDto;
use crate::inbound::http::csrf::CsrfTokenResponse;
use crate::inbound::http::events::EventDto;
use crate::inbound::http::forms::{FormSubmissionDto, FormSubmissionResponse};
use crate::inbound::http::newsletter::{NewsletterSignupDto, NewsletterSignupResponse};
use crate::inbound::http::payments::{
    CreateDonationDto, CreateDonationResponseDto, VerifyPaymentDto, VerifyPaymentResponseDto,
};
use crate::inbound::http::users::{LoginDto, SignupDto, UserDto};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Donation platform backend API",
        description = "HTTP interface for donations, payment verification, content reads, and form intake."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::payments::create_donation,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::causes::list_causes,
        crate::inbound::http::causes::get_cause,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::newsletter::newsletter_signup,
        crate::inbound::http::forms::contact,
        crate::inbound::http::forms::volunteer,
        crate::inbound::http::forms::feedback,
        crate::inbound::http::csrf::csrf_token,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CauseDto,
        EventDto,
        UserDto,
        SignupDto,
        LoginDto,
        CreateDonationDto,
        CreateDonationResponseDto,
        VerifyPaymentDto,
        VerifyPaymentResponseDto,
        NewsletterSignupDto,
        NewsletterSignupResponse,
        FormSubmissionDto,
        FormSubmissionResponse,
        CsrfTokenResponse,
    )),
    tags(
        (name = "donations", description = "Donation intake and payment verification"),
        (name = "auth", description = "Signup, login, and session management"),
        (name = "causes", description = "Fundraising cause reads"),
        (name = "events", description = "Community event reads"),
        (name = "forms", description = "Public form intake and CSRF tokens"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_registers_the_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/payments/verify",
            "/api/v1/donations",
            "/api/v1/auth/signup",
            "/api/v1/causes/{slug}",
            "/api/v1/events",
            "/api/v1/newsletter",
            "/api/v1/csrf-token",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.keys().any(|key| key.contains("Error")));
    }
}
