//! API authentication tests
//!
//! Requests without a resolvable identity are rejected before any database
//! work happens, so these run against a lazy pool with no server running.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/leadhub_test")
        .expect("lazy pool");
    Router::new().nest("/api/v1", leadhub_server::features::router(pool))
}

async fn status_of(app: Router, request: Request<Body>) -> StatusCode {
    app.oneshot(request).await.expect("request").status()
}

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/v1/buyers")
        .body(Body::empty())
        .expect("request");
    assert_eq!(status_of(test_app(), request).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_identity_header_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/v1/buyers")
        .header("x-user-id", "not-a-uuid")
        .body(Body::empty())
        .expect("request");
    assert_eq!(status_of(test_app(), request).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_surfaces_require_identity() {
    for uri in ["/api/v1/users", "/api/v1/dashboard", "/api/v1/buyers/export"] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        assert_eq!(
            status_of(test_app(), request).await,
            StatusCode::UNAUTHORIZED,
            "expected 401 for {}",
            uri
        );
    }
}

#[tokio::test]
async fn unauthorized_body_carries_error_code() {
    let request = Request::builder()
        .uri("/api/v1/buyers")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}
