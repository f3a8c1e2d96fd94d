pub mod order;
pub mod response;
pub mod payment;
pub mod grant;

pub use order::*;
pub use response::*;
pub use payment::*;
pub use grant::*;
