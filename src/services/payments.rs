use crate::{
    error::ShopError,
    models::{DownloadGrant, DownloadQuery, VerificationClaim, VerifyPaymentRequest},
    services::{GrantStore, SalesLedger, SignatureVerifier},
};
use std::sync::Arc;

pub const DOWNLOAD_PATH: &str = "/download-ebook";

/// Checks checkout callbacks and hands out Download Grants.
pub struct PaymentVerifier {
    signatures: SignatureVerifier,
    grants: Arc<GrantStore>,
    ledger: Arc<SalesLedger>,
}

impl PaymentVerifier {
    pub fn new(
        signatures: SignatureVerifier,
        grants: Arc<GrantStore>,
        ledger: Arc<SalesLedger>,
    ) -> Self {
        Self {
            signatures,
            grants,
            ledger,
        }
    }

    /// The only place a grant can be created.
    pub async fn verify(&self, claim: &VerificationClaim) -> Result<DownloadGrant, ShopError> {
        let valid = self
            .signatures
            .verify(&claim.order_id, &claim.payment_id, &claim.signature);
        self.ledger.record_verification(valid);

        if !valid {
            tracing::warn!(
                order_id = %claim.order_id,
                payment_id = %claim.payment_id,
                "Payment signature mismatch"
            );
            return Err(ShopError::InvalidSignature);
        }

        tracing::info!(
            order_id = %claim.order_id,
            payment_id = %claim.payment_id,
            "Payment verified"
        );

        Ok(self.grants.issue(&claim.payment_id, &claim.order_id).await)
    }
}

impl TryFrom<VerifyPaymentRequest> for VerificationClaim {
    type Error = ShopError;

    fn try_from(request: VerifyPaymentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: present(request.razorpay_order_id, "razorpay_order_id")?,
            payment_id: present(request.razorpay_payment_id, "razorpay_payment_id")?,
            signature: present(request.razorpay_signature, "razorpay_signature")?,
        })
    }
}

fn present(value: Option<String>, field: &'static str) -> Result<String, ShopError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ShopError::MissingField(field))
}

/// Relative URL of the download endpoint for a payment.
pub fn download_url(payment_id: &str) -> Result<String, ShopError> {
    let query = serde_urlencoded::to_string(DownloadQuery {
        payment_id: Some(payment_id.to_string()),
    })
    .map_err(|e| ShopError::InternalError(e.to_string()))?;
    Ok(format!("{}?{}", DOWNLOAD_PATH, query))
}
