//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (storage ping)
//!
//! # Profile API
//! GET  /api/profile/{user_id}                   - Profile view
//! PUT  /api/profile/{user_id}                   - Update name and social handles
//! PUT  /api/profile/{user_id}/name              - Update name only
//! PUT  /api/profile/{user_id}/social/{platform} - Upsert one social account
//! PUT  /api/profile/{user_id}/traits            - Save onboarding traits
//! ```

pub mod profile;

use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    middleware::from_fn,
    routing::{get, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the profile API router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(profile::show).put(profile::update))
        .route("/{user_id}/name", put(profile::update_name))
        .route("/{user_id}/social/{platform}", put(profile::upsert_social))
        .route("/{user_id}/traits", put(profile::save_traits))
}

/// Build the full application router with tracing, request id and CORS layers.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/profile", profile_routes())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::PUT])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if profile storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.profiles().repository().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use heartline_core::UserId;

    use super::*;
    use crate::config::ServerConfig;
    use crate::db::{MemoryProfileRepository, ProfileRepository};

    async fn test_app() -> Router {
        let repo = Arc::new(MemoryProfileRepository::new());
        repo.create_user(&UserId::parse("alice").unwrap(), "Alice", None)
            .await
            .unwrap();
        app(AppState::new(ServerConfig::in_memory(), repo))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_with_memory_storage() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_then_get() {
        let app = test_app().await;

        let (status, body) = call(
            &app,
            "PUT",
            "/api/profile/alice",
            Some(json!({
                "name": "Alice W",
                "socialHandles": [
                    {"platform": "Twitter", "username": "alice_w", "isVerified": false},
                    {"platform": "Telegram", "username": "", "isVerified": false}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["handles"][0]["outcome"], "created");
        assert_eq!(body["data"]["handles"][1]["outcome"], "skipped");

        let (status, body) = call(&app, "GET", "/api/profile/alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["user"]["name"], "Alice W");
        assert_eq!(
            body["data"]["socialHandles"],
            json!([{
                "platform": "twitter",
                "username": "alice_w",
                "isVerified": false,
                "verification": "unverified",
                "verifiedAt": null
            }])
        );
    }

    #[tokio::test]
    async fn test_missing_name_is_bad_request() {
        let app = test_app().await;
        let (status, body) = call(
            &app,
            "PUT",
            "/api/profile/alice",
            Some(json!({"socialHandles": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "error": "Missing required fields"})
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = test_app().await;
        let (status, body) = call(&app, "PUT", "/api/profile/alice/name", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let app = test_app().await;

        let (status, body) = call(&app, "GET", "/api/profile/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "error": "User not found"}));

        let (status, _) = call(
            &app,
            "PUT",
            "/api/profile/nobody/social/twitter",
            Some(json!({"username": "ghost", "isVerified": false})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_social_upsert_and_verify() {
        let app = test_app().await;

        let (status, body) = call(
            &app,
            "PUT",
            "/api/profile/alice/social/Twitter",
            Some(json!({"username": "alice_w", "isVerified": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"platform": "twitter", "outcome": "created"}));

        let (_, body) = call(
            &app,
            "PUT",
            "/api/profile/alice/social/twitter",
            Some(json!({"username": "alice_w", "isVerified": true})),
        )
        .await;
        assert_eq!(body["data"]["outcome"], "updated");

        let (_, body) = call(&app, "GET", "/api/profile/alice", None).await;
        let handles = body["data"]["socialHandles"].as_array().unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0]["isVerified"], true);
        assert_eq!(handles[0]["verification"], "verified");
    }

    #[tokio::test]
    async fn test_traits_roundtrip_through_profile() {
        let app = test_app().await;

        let (status, _) = call(
            &app,
            "PUT",
            "/api/profile/alice/traits",
            Some(json!({
                "age": 31,
                "gender": "Non-binary",
                "selectedTraits": [
                    {"emoji": "🎨", "label": "Painting", "category": "creativity"},
                    {"emoji": "🖌️", "label": "Painting", "category": "creativity"}
                ],
                "wantedTraits": [{"emoji": "🥾", "label": "Hiking", "category": "sports"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(&app, "GET", "/api/profile/alice", None).await;
        let traits = &body["data"]["traits"];
        assert_eq!(traits["age"], 31);
        assert_eq!(traits["gender"], "Non-binary");
        assert_eq!(traits["selectedTraits"].as_array().unwrap().len(), 1);
        assert_eq!(traits["selectedTraits"][0]["emoji"], "🎨");
    }

    #[tokio::test]
    async fn test_invalid_age_rejected() {
        let app = test_app().await;
        let (status, _) = call(
            &app,
            "PUT",
            "/api/profile/alice/traits",
            Some(json!({"age": 12, "selectedTraits": [], "wantedTraits": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
