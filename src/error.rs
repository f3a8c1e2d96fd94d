use crate::services::{GatewayError, GrantError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failures of the JSON API endpoints.
#[derive(Error, Debug)]
pub enum ShopError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ShopError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShopError::Gateway(_) | ShopError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ShopError::InvalidSignature
            | ShopError::MissingField(_)
            | ShopError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ShopError::Gateway(_) => "ORDER_CREATION_FAILED",
            ShopError::InvalidSignature => "INVALID_SIGNATURE",
            ShopError::MissingField(_) => "MISSING_FIELD",
            ShopError::InvalidRequest(_) => "INVALID_REQUEST",
            ShopError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Text placed in the response body. Upstream details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ShopError::Gateway(_) => "Failed to create payment order".to_string(),
            ShopError::InternalError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = ?self,
                error_code = error_code,
                request_id = %request_id,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                error_code = error_code,
                request_id = %request_id,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            success: false,
            error: self.public_message(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Failures of the file endpoint, answered as plain text.
#[derive(Error, Debug)]
pub enum DownloadRejection {
    #[error("Download not found")]
    MissingPaymentId,

    #[error("No verified payment for this download")]
    NotGranted,

    #[error("Download link has expired")]
    Expired,

    #[error("Download limit reached")]
    Exhausted,

    #[error("Ebook file not found")]
    AssetMissing,

    #[error("Error downloading file")]
    Stream(String),
}

impl DownloadRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            DownloadRejection::MissingPaymentId | DownloadRejection::AssetMissing => {
                StatusCode::NOT_FOUND
            }
            DownloadRejection::NotGranted => StatusCode::FORBIDDEN,
            DownloadRejection::Expired | DownloadRejection::Exhausted => StatusCode::GONE,
            DownloadRejection::Stream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GrantError> for DownloadRejection {
    fn from(err: GrantError) -> Self {
        match err {
            GrantError::NotFound => DownloadRejection::NotGranted,
            GrantError::Expired => DownloadRejection::Expired,
            GrantError::Exhausted => DownloadRejection::Exhausted,
        }
    }
}

impl IntoResponse for DownloadRejection {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            DownloadRejection::Stream(detail) => {
                tracing::error!(error = %detail, "Error downloading file");
            }
            other => tracing::warn!(status = %status, reason = %other, "Download refused"),
        }

        (status, self.to_string()).into_response()
    }
}
