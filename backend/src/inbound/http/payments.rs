//! Donation and payment verification endpoints.
//!
//! ```text
//! POST /api/v1/donations        {"amount":25000,"currency":"INR",...}
//! POST /api/v1/payments/verify  {"orderId":"...","paymentId":"...","signature":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{CreateDonationRequest, VerifyPaymentRequest};
use crate::domain::{Amount, CurrencyCode, DonationStatus, Error, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/donations`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationDto {
    /// Amount in minor currency units (e.g. paise).
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Donor's name.
    pub donor_name: String,
    /// Donor's email for the receipt.
    pub donor_email: String,
    /// Slug of the cause to fund; omit for a general donation.
    #[serde(default)]
    pub cause_slug: Option<String>,
    /// Whether to withhold the donor's name from public listings.
    #[serde(default)]
    pub anonymous: bool,
    /// Optional dedication text (inline markup subset allowed).
    #[serde(default)]
    pub dedication: Option<String>,
}

impl TryFrom<CreateDonationDto> for CreateDonationRequest {
    type Error = Error;

    fn try_from(dto: CreateDonationDto) -> Result<Self, Self::Error> {
        let amount = Amount::from_minor(dto.amount).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "amount", "code": "out_of_range" }))
        })?;
        let currency = CurrencyCode::new(dto.currency).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "currency", "code": "format" }))
        })?;
        let cause_slug = dto
            .cause_slug
            .map(Slug::new)
            .transpose()
            .map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "field": "causeSlug", "code": "format" }))
            })?;

        Ok(Self {
            amount,
            currency,
            donor_name: dto.donor_name,
            donor_email: dto.donor_email,
            cause_slug,
            anonymous: dto.anonymous,
            dedication: dto.dedication,
        })
    }
}

/// Response body for `POST /api/v1/donations`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationResponseDto {
    /// Identifier of the pending donation record.
    pub donation_id: Uuid,
    /// Gateway order id the client pays against.
    pub order_id: String,
    /// Echoed amount in minor units.
    pub amount: i64,
    /// Echoed currency code.
    pub currency: String,
}

/// Open a donation: create a gateway order and a pending ledger record.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = CreateDonationDto,
    tags = ["donations"],
    security([]),
    responses(
        (status = 201, description = "Donation opened", body = CreateDonationResponseDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Cause not accepting donations", body = Error),
        (status = 402, description = "Gateway rejected the order", body = Error),
        (status = 503, description = "Gateway unreachable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[post("/donations")]
pub async fn create_donation(
    state: web::Data<HttpState>,
    payload: web::Json<CreateDonationDto>,
) -> ApiResult<HttpResponse> {
    let request = CreateDonationRequest::try_from(payload.into_inner())?;
    let response = state.donations.create_donation(request).await?;
    Ok(HttpResponse::Created().json(CreateDonationResponseDto {
        donation_id: response.donation_id,
        order_id: response.order_id,
        amount: response.amount_minor,
        currency: response.currency,
    }))
}

/// Request body for `POST /api/v1/payments/verify`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentDto {
    /// Gateway order id.
    pub order_id: String,
    /// Gateway payment id.
    pub payment_id: String,
    /// Gateway signature over the order/payment pair.
    pub signature: String,
}

fn require_field(value: &str, field: &'static str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(
            Error::invalid_request(format!("missing required field: {field}"))
                .with_details(json!({ "field": field, "code": "missing_field" })),
        );
    }
    Ok(())
}

impl TryFrom<VerifyPaymentDto> for VerifyPaymentRequest {
    type Error = Error;

    fn try_from(dto: VerifyPaymentDto) -> Result<Self, Self::Error> {
        require_field(&dto.order_id, "orderId")?;
        require_field(&dto.payment_id, "paymentId")?;
        require_field(&dto.signature, "signature")?;
        Ok(Self {
            order_id: dto.order_id,
            payment_id: dto.payment_id,
            signature: dto.signature,
        })
    }
}

/// Response body for `POST /api/v1/payments/verify`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponseDto {
    /// Whether the verification flow completed.
    pub success: bool,
    /// Echoed gateway payment id.
    pub payment_id: String,
    /// Settlement status derived from the gateway's payment state.
    pub status: DonationStatus,
}

/// Verify a gateway payment callback and settle the matching donation.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyPaymentDto,
    tags = ["donations"],
    security([]),
    responses(
        (status = 200, description = "Verification completed", body = VerifyPaymentResponseDto),
        (status = 400, description = "Invalid signature or payload", body = Error),
        (status = 402, description = "Gateway reported payment failure", body = Error),
        (status = 503, description = "Gateway unreachable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[post("/payments/verify")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyPaymentDto>,
) -> ApiResult<web::Json<VerifyPaymentResponseDto>> {
    let request = VerifyPaymentRequest::try_from(payload.into_inner())?;
    let response = state.donations.verify_payment(request).await?;
    Ok(web::Json(VerifyPaymentResponseDto {
        success: response.success,
        payment_id: response.payment_id,
        status: response.status,
    }))
}
