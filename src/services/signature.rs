//! Checkout callback signature verification.
//!
//! The gateway signs `order_id + "|" + payment_id` with HMAC-SHA256 keyed by
//! the account secret and sends the lowercase hex digest. Any change to the
//! delimiter, ordering or encoding breaks interoperability.

use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub struct SignatureVerifier {
    /// Keyed once at startup, cloned per computation.
    mac: HmacSha256,
}

impl SignatureVerifier {
    pub fn new(secret: &SecretString) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| anyhow!("Invalid signing key: {}", e))?;
        Ok(Self { mac })
    }

    /// Hex digest the gateway would send for this order/payment pair.
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = self.expected_signature(order_id, payment_id);
        constant_time_compare(expected.as_bytes(), signature.as_bytes())
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
