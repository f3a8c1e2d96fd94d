use crate::{
    config::{ProductConfig, MAX_RECEIPT_LEN},
    models::{CheckoutOrder, OrderRequest},
    services::{GatewayError, PaymentGateway, SalesLedger},
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Opens orders at the gateway for the configured product.
pub struct OrderInitiator {
    gateway: Arc<dyn PaymentGateway>,
    key_id: String,
    product: ProductConfig,
    ledger: Arc<SalesLedger>,
}

impl OrderInitiator {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        key_id: impl Into<String>,
        product: ProductConfig,
        ledger: Arc<SalesLedger>,
    ) -> Self {
        Self {
            gateway,
            key_id: key_id.into(),
            product,
            ledger,
        }
    }

    pub async fn create_order(&self) -> Result<CheckoutOrder, GatewayError> {
        let request = OrderRequest {
            amount: self.product.amount,
            currency: self.product.currency.clone(),
            receipt: receipt_label(&self.product.receipt_prefix),
            notes: HashMap::from([("product".to_string(), self.product.name.clone())]),
        };

        let order = self.gateway.create_order(&request).await?;
        self.ledger.record_order();

        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            receipt = %request.receipt,
            "Payment order created"
        );

        Ok(CheckoutOrder {
            key: self.key_id.clone(),
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

/// `<prefix>_<unix millis>_<8 hex>`; the suffix separates same-millisecond
/// requests.
fn receipt_label(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let mut receipt = format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..8]);
    receipt.truncate(MAX_RECEIPT_LEN);
    receipt
}
