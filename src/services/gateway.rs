//! Payment gateway port and its Razorpay REST implementation.

use crate::models::{GatewayOrder, OrderRequest};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Gateway rejected request ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

/// Remote service that records payment intent before checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError>;
}

pub struct RazorpayGateway {
    api_url: String,
    key_id: String,
    key_secret: SecretString,
    client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(
        api_url: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url: api_url.into(),
            key_id: key_id.into(),
            key_secret,
            client,
        })
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.api_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let description = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(ErrorEnvelope { error }) => format!(
                    "{}: {}",
                    error.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                    error.description.unwrap_or_default()
                ),
                Err(_) => text,
            };
            return Err(GatewayError::Api {
                status: status.as_u16(),
                description,
            });
        }

        let order: GatewayOrder = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        tracing::debug!(order_id = %order.id, receipt = ?order.receipt, "Gateway order created");

        Ok(order)
    }
}
