pub mod grant;

pub use grant::grant_middleware_layer;
