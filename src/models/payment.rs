use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Checkout callback values as posted by the storefront. Fields are
/// optional here so that absence is reported as a 400 by the verifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_payment_id: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationClaim {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub download_url: String,
    pub expires_at: DateTime<Utc>,
    pub downloads_remaining: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadQuery {
    pub payment_id: Option<String>,
}
