use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(
    State(state): State<AppState>,
) -> Json<HealthStatus> {
    let asset_available = state.fulfillment.asset().exists().await;

    // Without the asset every paid download would fail
    let status = if asset_available { "healthy" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        asset_available,
        uptime_seconds: state.ledger.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
