pub mod gateway;
pub mod signature;
pub mod grants;
pub mod ledger;
pub mod orders;
pub mod payments;
pub mod fulfillment;

pub use gateway::{GatewayError, PaymentGateway, RazorpayGateway};
pub use signature::SignatureVerifier;
pub use grants::{GrantError, GrantStore};
pub use ledger::SalesLedger;
pub use orders::OrderInitiator;
pub use payments::{download_url, PaymentVerifier, DOWNLOAD_PATH};
pub use fulfillment::{EbookAsset, FulfillmentGate};
