use crate::{error::DownloadRejection, handlers::AppState, models::DownloadGrant};
use axum::{extract::State, http::Method, response::Response, Extension};

/// Grant admission already happened in the grant middleware. HEAD answers
/// with the file's headers and leaves the grant untouched.
pub async fn download_ebook(
    method: Method,
    State(state): State<AppState>,
    Extension(grant): Extension<DownloadGrant>,
) -> Result<Response, DownloadRejection> {
    if method == Method::HEAD {
        return state.fulfillment.describe(&grant.payment_id).await;
    }
    state.fulfillment.deliver(&grant.payment_id).await
}
