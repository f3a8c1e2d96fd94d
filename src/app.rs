use crate::{
    config::Config,
    handlers::*,
    middleware::grant_middleware_layer,
    services::*,
};
use anyhow::Result;
use axum::{
    extract::Request,
    middleware::{self as axum_middleware, Next},
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Wires the three checkout components around the given gateway.
pub fn build_state(config: &Config, gateway: Arc<dyn PaymentGateway>) -> Result<AppState> {
    let ledger = Arc::new(SalesLedger::new());
    let grants = Arc::new(GrantStore::with_capacity(
        config.download_limit,
        config.grant_ttl,
        config.grant_capacity,
    ));

    let orders = OrderInitiator::new(
        gateway,
        config.razorpay_key_id.clone(),
        config.product.clone(),
        ledger.clone(),
    );
    let payments = PaymentVerifier::new(
        SignatureVerifier::new(&config.razorpay_key_secret)?,
        grants.clone(),
        ledger.clone(),
    );
    let fulfillment = FulfillmentGate::new(
        grants,
        EbookAsset::new(&config.ebook_path, config.ebook_filename.clone()),
        ledger.clone(),
    );

    Ok(AppState {
        orders: Arc::new(orders),
        payments: Arc::new(payments),
        fulfillment: Arc::new(fulfillment),
        ledger,
    })
}

pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    let gate = state.fulfillment.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/create-order", post(create_order))
        .route("/verify-payment", post(verify_payment))
        // Paid endpoint (grant required)
        .route(
            DOWNLOAD_PATH,
            get(download_ebook).layer(axum_middleware::from_fn(
                move |req: Request, next: Next| {
                    let gate = gate.clone();
                    async move { grant_middleware_layer(gate, req, next).await }
                },
            )),
        )
        .with_state(state)
        // Storefront
        .route_service("/", ServeFile::new(public_dir.join("index.html")))
        .fallback_service(ServeDir::new(public_dir))
        // Global middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
