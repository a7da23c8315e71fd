//! Cause read endpoints.
//!
//! ```text
//! GET /api/v1/causes?limit=20&offset=0
//! GET /api/v1/causes/{slug}
//! ```

use actix_web::{get, web};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::CausePersistenceError;
use crate::domain::{Cause, CauseStatus, Error, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Public view of a fundraising cause.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CauseDto {
    /// Stable cause identifier.
    pub id: Uuid,
    /// URL-safe identifier for the public page.
    pub slug: String,
    /// Campaign headline.
    pub title: String,
    /// Short public description.
    pub summary: String,
    /// Funding goal in minor units, when the campaign has one.
    pub goal: Option<i64>,
    /// Cumulative amount raised in minor units.
    pub raised: i64,
    /// Cumulative count of successful donations.
    pub donors_count: i64,
    /// Lifecycle state.
    pub status: CauseStatus,
}

impl From<Cause> for CauseDto {
    fn from(cause: Cause) -> Self {
        Self {
            id: cause.id,
            slug: cause.slug.into(),
            title: cause.title,
            summary: cause.summary,
            goal: cause.goal_minor,
            raised: cause.raised_minor,
            donors_count: cause.donors_count,
            status: cause.status,
        }
    }
}

/// Query parameters for the cause listing.
#[derive(Debug, Deserialize)]
pub struct CauseListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

fn map_cause_persistence_error(err: CausePersistenceError) -> Error {
    match err {
        CausePersistenceError::Connection { message } => Error::service_unavailable(message),
        CausePersistenceError::Query { message } => Error::internal(message),
    }
}

/// List publicly visible causes.
#[utoipa::path(
    get,
    path = "/api/v1/causes",
    tags = ["causes"],
    security([]),
    params(
        ("limit" = Option<u32>, Query, description = "Page size, clamped to 100"),
        ("offset" = Option<u32>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Causes page"),
        (status = 503, description = "Database unavailable", body = Error)
    )
)]
#[get("/causes")]
pub async fn list_causes(
    state: web::Data<HttpState>,
    query: web::Query<CauseListQuery>,
) -> ApiResult<web::Json<Page<CauseDto>>> {
    let page = PageRequest::from_raw(query.limit, query.offset);
    let causes = state
        .causes
        .list(page)
        .await
        .map_err(map_cause_persistence_error)?;
    Ok(web::Json(causes.map(CauseDto::from)))
}

/// Fetch one cause by slug.
#[utoipa::path(
    get,
    path = "/api/v1/causes/{slug}",
    tags = ["causes"],
    security([]),
    params(("slug" = String, Path, description = "Cause slug")),
    responses(
        (status = 200, description = "Cause", body = CauseDto),
        (status = 404, description = "Unknown slug", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    )
)]
#[get("/causes/{slug}")]
pub async fn get_cause(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CauseDto>> {
    let raw = path.into_inner();
    // A slug that cannot exist is indistinguishable from one that does not.
    let slug = Slug::new(raw).map_err(|_| Error::not_found("no such cause"))?;
    let cause = state
        .causes
        .find_by_slug(&slug)
        .await
        .map_err(map_cause_persistence_error)?
        .ok_or_else(|| Error::not_found("no such cause"))?;
    Ok(web::Json(CauseDto::from(cause)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_state;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    macro_rules! causes_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .service(web::scope("/api/v1").service(list_causes).service(get_cause)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn list_returns_seeded_cause() {
        let handles = test_state();
        let app = causes_app!(handles.state);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/causes").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value.get("total").and_then(Value::as_u64), Some(1));
        let first = &value.get("items").and_then(Value::as_array).expect("items")[0];
        assert_eq!(
            first.get("slug").and_then(Value::as_str),
            Some("clean-water")
        );
    }

    #[actix_web::test]
    async fn unknown_slug_is_a_clean_not_found() {
        let handles = test_state();
        let app = causes_app!(handles.state);

        for uri in [
            "/api/v1/causes/no-such-cause",
            "/api/v1/causes/NOT%20A%20SLUG",
        ] {
            let res =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
            let value: Value = test::read_body_json(res).await;
            assert_eq!(
                value.get("code").and_then(Value::as_str),
                Some("not_found"),
                "{uri}"
            );
        }
    }

    #[actix_web::test]
    async fn get_returns_the_cause_payload() {
        let handles = test_state();
        let app = causes_app!(handles.state);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/causes/clean-water")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = test::read_body_json(res).await;
        assert_eq!(value.get("raised").and_then(Value::as_i64), Some(0));
        assert_eq!(value.get("donorsCount").and_then(Value::as_i64), Some(0));
        assert_eq!(value.get("status").and_then(Value::as_str), Some("active"));
    }
}
