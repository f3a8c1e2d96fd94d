use crate::{
    error::DownloadRejection,
    models::DownloadGrant,
    services::{GrantStore, SalesLedger},
};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::Response,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// The file being sold and the name the browser saves it under.
#[derive(Debug, Clone)]
pub struct EbookAsset {
    pub path: PathBuf,
    pub filename: String,
}

impl EbookAsset {
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
        }
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    fn content_disposition(&self) -> Result<HeaderValue, DownloadRejection> {
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", self.filename))
            .map_err(|e| DownloadRejection::Stream(format!("bad filename header: {}", e)))
    }
}

/// Releases the e-book only against a live Download Grant.
pub struct FulfillmentGate {
    grants: Arc<GrantStore>,
    asset: EbookAsset,
    ledger: Arc<SalesLedger>,
}

impl FulfillmentGate {
    pub fn new(grants: Arc<GrantStore>, asset: EbookAsset, ledger: Arc<SalesLedger>) -> Self {
        Self {
            grants,
            asset,
            ledger,
        }
    }

    pub fn asset(&self) -> &EbookAsset {
        &self.asset
    }

    /// Admission check; spends nothing.
    pub async fn authorize(
        &self,
        payment_id: Option<&str>,
    ) -> Result<DownloadGrant, DownloadRejection> {
        let payment_id = payment_id
            .filter(|id| !id.is_empty())
            .ok_or(DownloadRejection::MissingPaymentId)?;

        Ok(self.grants.authorize(payment_id).await?)
    }

    /// Opens the file, spends one download and returns the streaming
    /// response. Nothing is spent when the file cannot be opened.
    pub async fn deliver(&self, payment_id: &str) -> Result<Response, DownloadRejection> {
        let response = self.open(Method::GET).await?;

        let grant = self.grants.redeem(payment_id).await?;
        self.ledger.record_download();

        tracing::info!(
            payment_id = %payment_id,
            downloads_remaining = grant.downloads_remaining(),
            "Ebook download started"
        );

        Ok(response)
    }

    /// Headers of the download without a body. Spends nothing.
    pub async fn describe(&self, payment_id: &str) -> Result<Response, DownloadRejection> {
        let response = self.open(Method::HEAD).await?;
        tracing::debug!(payment_id = %payment_id, "Ebook download headers served");
        Ok(response)
    }

    async fn open(&self, method: Method) -> Result<Response, DownloadRejection> {
        // A bare request: range and conditional headers from the client would
        // turn a paid download into a partial or empty one.
        let mut request = Request::new(Body::empty());
        *request.method_mut() = method;
        let response = ServeFile::new(&self.asset.path)
            .oneshot(request)
            .await
            .map_err(|e| DownloadRejection::Stream(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(DownloadRejection::AssetMissing),
            status => {
                return Err(DownloadRejection::Stream(format!(
                    "file service answered {}",
                    status
                )))
            }
        }

        let mut response = response.map(Body::new);
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, self.asset.content_disposition()?);
        Ok(response)
    }
}
