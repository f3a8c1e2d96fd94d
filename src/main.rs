use anyhow::Result;
use ebook_checkout::{
    app::{build_router, build_state},
    config::{Config, LogFormat},
    services::RazorpayGateway,
};
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing comes up before config so validation is logged
    dotenvy::dotenv().ok();
    let log_format =
        LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()))?;
    init_tracing(&log_format);

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting ebook-checkout v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize services
    let gateway = Arc::new(RazorpayGateway::new(
        config.razorpay_api_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
        config.gateway_timeout,
    )?);
    let state = build_state(&config, gateway)?;

    if !state.fulfillment.asset().exists().await {
        tracing::warn!(
            path = %config.ebook_path.display(),
            "Ebook file not found, downloads will fail until it is in place"
        );
    }

    let app = build_router(state, &config.public_dir);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!(
        amount = config.product.amount,
        currency = %config.product.currency,
        "Selling {}",
        config.product.name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_current_span(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutting down gracefully...");
}
