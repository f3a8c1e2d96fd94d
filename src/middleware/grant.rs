use crate::{error::DownloadRejection, models::DownloadQuery, services::FulfillmentGate};
use axum::{
    extract::{Query, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

// Axum middleware function
pub async fn grant_middleware_layer(
    gate: Arc<FulfillmentGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, DownloadRejection> {
    // An unparseable query is treated like a missing payment id
    let payment_id = Query::<DownloadQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.payment_id);

    let grant = gate.authorize(payment_id.as_deref()).await?;

    // Grant admitted, hand it to the download handler
    request.extensions_mut().insert(grant);
    Ok(next.run(request).await)
}
