//! Request logging, panic recovery, CORS, body size and timeout layers.

use axum::{
    extract::Request,
    http::{HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{any::Any, time::Duration, time::Instant};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
};
use tracing::{error, info, warn};

use crate::{error::ApiError, settings::SecurityConfig};

/// Panic-to-response converter used by [`create_panic_layer`].
pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Log method, path, status and latency of every request.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    if status.is_client_error() || status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "request completed");
    }

    response
}

/// Turn a handler panic into a 500 with the usual JSON error body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    error!("Handler panicked: {}", detail);
    ApiError::Internal("handler panicked".to_string()).into_response()
}

pub fn create_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

/// Create CORS layer from security configuration
pub fn create_cors_layer(config: &SecurityConfig) -> CorsLayer {
    if config.enable_cors {
        let mut cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
            .expose_headers([axum::http::header::LOCATION]);

        if config.allowed_origins.iter().any(|origin| origin == "*") {
            cors = cors.allow_origin(AnyOrigin);
        } else {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        // Restrictive CORS when disabled
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost"))
            .allow_methods([Method::GET])
    }
}

/// Create request body size limit layer
pub fn create_body_limit_layer(max_size_mb: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_size_mb.saturating_mul(1024 * 1024))
}

pub fn create_timeout_layer(seconds: u64) -> TimeoutLayer {
    TimeoutLayer::new(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        routing::get,
        Router,
    };
    use tower::ServiceExt;
    use tracing_test::traced_test;

    async fn explode() -> &'static str {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let app = Router::new()
            .route("/explode", get(explode))
            .layer(create_panic_layer());

        let response = app
            .oneshot(HttpRequest::get("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_requests_are_logged() {
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .layer(axum::middleware::from_fn(request_logging_middleware));

        let response = app
            .clone()
            .oneshot(HttpRequest::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(logs_contain("request completed"));

        let response = app
            .oneshot(HttpRequest::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(logs_contain("request failed"));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let config = SecurityConfig {
            enable_cors: true,
            allowed_origins: vec!["https://example.com".to_string()],
            ..Default::default()
        };

        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(create_cors_layer(&config));

        let response = app
            .oneshot(
                HttpRequest::get("/ping")
                    .header(header::ORIGIN, "https://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("https://example.com"))
        );
    }

    #[tokio::test]
    async fn test_body_limit_rejects_large_payloads() {
        let app = Router::new()
            .route("/echo", axum::routing::post(|body: String| async move { body }))
            .layer(create_body_limit_layer(1));

        let oversized = "x".repeat(1024 * 1024 + 1);
        let response = app
            .oneshot(
                HttpRequest::post("/echo")
                    .header(header::CONTENT_LENGTH, oversized.len())
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_body_limit_saturates_on_huge_sizes() {
        let _layer = create_body_limit_layer(usize::MAX);
    }

    async fn linger() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "too late"
    }

    #[tokio::test]
    async fn test_slow_requests_time_out() {
        tokio::time::pause();

        let app = Router::new()
            .route("/slow", get(linger))
            .route("/fast", get(|| async { "ok" }))
            .layer(create_timeout_layer(1));

        let response = app
            .clone()
            .oneshot(HttpRequest::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let response = app
            .oneshot(HttpRequest::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
