use crate::{
    error::ShopError,
    handlers::AppState,
    models::{VerificationClaim, VerifyPaymentRequest, VerifyPaymentResponse},
    services::download_url,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

pub async fn verify_payment(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, ShopError> {
    let Json(request) = payload.map_err(|e| ShopError::InvalidRequest(e.body_text()))?;
    let claim = VerificationClaim::try_from(request)?;

    let grant = state.payments.verify(&claim).await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        download_url: download_url(&grant.payment_id)?,
        expires_at: grant.expires_at,
        downloads_remaining: grant.downloads_remaining(),
    }))
}
