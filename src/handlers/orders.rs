use crate::{error::ShopError, handlers::AppState, models::CheckoutOrder};
use axum::{extract::State, Json};

pub async fn create_order(
    State(state): State<AppState>,
) -> Result<Json<CheckoutOrder>, ShopError> {
    let order = state.orders.create_order().await?;
    Ok(Json(order))
}
