pub mod orders;
pub mod payments;
pub mod download;
pub mod health;
pub mod stats;

pub use orders::*;
pub use payments::*;
pub use download::*;
pub use health::*;
pub use stats::*;

use crate::services::{FulfillmentGate, OrderInitiator, PaymentVerifier, SalesLedger};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderInitiator>,
    pub payments: Arc<PaymentVerifier>,
    pub fulfillment: Arc<FulfillmentGate>,
    pub ledger: Arc<SalesLedger>,
}
