//! End-to-end tests of the HTTP surface: order creation, payment
//! verification and grant-gated download, against a fake gateway.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use ebook_checkout::app::{build_router, build_state};
use ebook_checkout::config::Config;
use ebook_checkout::models::{GatewayOrder, OrderRequest};
use ebook_checkout::services::{GatewayError, PaymentGateway, SignatureVerifier};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SECRET: &str = "s3cr3t";
const ORDER_ID: &str = "order_ABC123";
const PAYMENT_ID: &str = "pay_XYZ789";
const PDF: &[u8] = b"%PDF-1.4 teachers ebook";

struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        Ok(GatewayOrder {
            id: ORDER_ID.to_string(),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".to_string()),
            created_at: Some(1_700_000_000),
        })
    }
}

struct BrokenGateway;

#[async_trait]
impl PaymentGateway for BrokenGateway {
    async fn create_order(&self, _: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::Api {
            status: 401,
            description: "BAD_REQUEST_ERROR: Authentication failed".to_string(),
        })
    }
}

struct Shop {
    app: Router,
    _dir: TempDir,
}

fn shop_with(gateway: Arc<dyn PaymentGateway>, with_asset: bool, limit: u32) -> Shop {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<html>storefront</html>").unwrap();

    let ebook = dir.path().join("draft3.pdf");
    if with_asset {
        std::fs::write(&ebook, PDF).unwrap();
    }

    let ebook_path = ebook.to_string_lossy().to_string();
    let public_dir = public.to_string_lossy().to_string();
    let limit = limit.to_string();
    let config = Config::from_lookup(|name| {
        let value = match name {
            "RAZORPAY_KEY_ID" => Some("rzp_test_key"),
            "RAZORPAY_KEY_SECRET" => Some(SECRET),
            "PORT" => Some("3000"),
            "PRODUCT_AMOUNT" => Some("100"),
            "EBOOK_PATH" => Some(ebook_path.as_str()),
            "PUBLIC_DIR" => Some(public_dir.as_str()),
            "DOWNLOAD_LIMIT" => Some(limit.as_str()),
            _ => None,
        };
        value.map(str::to_string)
    })
    .unwrap();

    let state = build_state(&config, gateway).unwrap();
    Shop {
        app: build_router(state, &config.public_dir),
        _dir: dir,
    }
}

fn shop() -> Shop {
    shop_with(Arc::new(FakeGateway), true, 2)
}

fn signature(order_id: &str, payment_id: &str) -> String {
    SignatureVerifier::new(&secrecy::SecretString::new(SECRET.to_string()))
        .unwrap()
        .expected_signature(order_id, payment_id)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn verify(app: &Router, signature: &str) -> (StatusCode, Value) {
    post_json(
        app,
        "/verify-payment",
        json!({
            "razorpay_payment_id": PAYMENT_ID,
            "razorpay_order_id": ORDER_ID,
            "razorpay_signature": signature,
        }),
    )
    .await
}

// =============================================================================
// Order Initiator
// =============================================================================

#[tokio::test]
async fn create_order_returns_gateway_order() {
    let shop = shop();

    let (status, body) = post_json(&shop.app, "/create-order", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "key": "rzp_test_key",
            "order_id": ORDER_ID,
            "amount": 100,
            "currency": "INR",
        })
    );
}

#[tokio::test]
async fn create_order_hides_gateway_failure() {
    let shop = shop_with(Arc::new(BrokenGateway), true, 1);

    let (status, body) = post_json(&shop.app, "/create-order", json!({})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to create payment order");
    assert!(!body.to_string().contains("Authentication failed"));
}

// =============================================================================
// Payment Verifier
// =============================================================================

#[tokio::test]
async fn valid_signature_returns_download_url() {
    let shop = shop();

    let (status, body) = verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["download_url"], "/download-ebook?payment_id=pay_XYZ789");
    assert_eq!(body["downloads_remaining"], 2);
}

#[tokio::test]
async fn other_signature_is_rejected() {
    let shop = shop();

    let (status, body) = verify(&shop.app, &"f".repeat(64)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid signature");
}

#[tokio::test]
async fn verification_is_idempotent() {
    let shop = shop();
    let sig = signature(ORDER_ID, PAYMENT_ID);

    let (_, first) = verify(&shop.app, &sig).await;
    let (status, second) = verify(&shop.app, &sig).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_field_is_bad_request() {
    let shop = shop();

    let (status, body) = post_json(
        &shop.app,
        "/verify-payment",
        json!({ "razorpay_payment_id": PAYMENT_ID, "razorpay_order_id": ORDER_ID }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "MISSING_FIELD");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let shop = shop();
    let request = Request::builder()
        .method("POST")
        .uri("/verify-payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&shop.app, request).await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_REQUEST");
}

// =============================================================================
// Fulfillment Gate
// =============================================================================

#[tokio::test]
async fn verified_payment_downloads_ebook() {
    let shop = shop();
    let (_, body) = verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    let url = body["download_url"].as_str().unwrap().to_string();

    let response = shop
        .app
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"ChatGPT for Teachers.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], PDF);
}

#[tokio::test]
async fn unverified_payment_cannot_download() {
    let shop = shop();

    let (status, body) = get(&shop.app, "/download-ebook?payment_id=pay_guessed").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_ne!(body, PDF);
}

#[tokio::test]
async fn failed_verification_grants_nothing() {
    let shop = shop();
    verify(&shop.app, &"0".repeat(64)).await;

    let (status, _) = get(&shop.app, "/download-ebook?payment_id=pay_XYZ789").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn empty_or_missing_payment_id_is_not_found() {
    let shop = shop();

    assert_eq!(get(&shop.app, "/download-ebook").await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        get(&shop.app, "/download-ebook?payment_id=").await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn download_limit_is_enforced() {
    let shop = shop();
    verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    let uri = "/download-ebook?payment_id=pay_XYZ789";

    assert_eq!(get(&shop.app, uri).await.0, StatusCode::OK);
    assert_eq!(get(&shop.app, uri).await.0, StatusCode::OK);
    assert_eq!(get(&shop.app, uri).await.0, StatusCode::GONE);

    // Replaying the callback does not refill the grant
    let (status, body) = verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["downloads_remaining"], 0);
    assert_eq!(get(&shop.app, uri).await.0, StatusCode::GONE);
}

#[tokio::test]
async fn head_requests_leave_downloads_untouched() {
    let shop = shop();
    verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    let uri = "/download-ebook?payment_id=pay_XYZ789";
    let head = || {
        Request::builder()
            .method("HEAD")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..3 {
        let (status, body) = send(&shop.app, head()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    let (_, body) = verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    assert_eq!(body["downloads_remaining"], 2);

    let (status, body) = get(&shop.app, uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PDF);
    assert_eq!(get(&shop.app, uri).await.0, StatusCode::OK);
    assert_eq!(get(&shop.app, uri).await.0, StatusCode::GONE);
}

#[tokio::test]
async fn head_without_grant_is_refused() {
    let shop = shop();
    let request = Request::builder()
        .method("HEAD")
        .uri("/download-ebook?payment_id=pay_guessed")
        .body(Body::empty())
        .unwrap();

    assert_eq!(send(&shop.app, request).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let shop = shop_with(Arc::new(FakeGateway), false, 1);
    verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;

    let (status, body) = get(&shop.app, "/download-ebook?payment_id=pay_XYZ789").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Ebook file not found");
}

// =============================================================================
// Storefront, health and stats
// =============================================================================

#[tokio::test]
async fn serves_storefront() {
    let shop = shop();

    let (status, body) = get(&shop.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>storefront</html>");
}

#[tokio::test]
async fn health_reports_missing_asset() {
    let shop = shop_with(Arc::new(FakeGateway), false, 1);

    let (status, body) = get(&shop.app, "/health").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["asset_available"], false);
}

#[tokio::test]
async fn stats_count_the_checkout() {
    let shop = shop();
    post_json(&shop.app, "/create-order", json!({})).await;
    verify(&shop.app, &"0".repeat(64)).await;
    verify(&shop.app, &signature(ORDER_ID, PAYMENT_ID)).await;
    get(&shop.app, "/download-ebook?payment_id=pay_XYZ789").await;

    let (_, body) = get(&shop.app, "/stats").await;
    let stats: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(
        stats,
        json!({
            "orders_created": 1,
            "payments_verified": 1,
            "verification_failures": 1,
            "downloads_served": 1,
        })
    );
}
