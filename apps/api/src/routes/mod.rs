pub mod health;

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use crate::auth::require_auth;
use crate::roasts::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let calendar = Router::new()
        .route(
            "/calendar",
            get(handlers::handle_get_calendar).post(handlers::handle_create_entry),
        )
        .route(
            "/calendar/:id",
            patch(handlers::handle_update_entry).delete(handlers::handle_delete_entry),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(calendar)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, StorageKind};
    use crate::roasts::calendar::CalendarZone;
    use crate::roasts::service::EntryService;
    use crate::roasts::storage::MemoryStorage;

    fn test_app() -> Router {
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            app_env: "development".to_string(),
            storage: StorageKind::Memory,
            database_url: None,
            enable_dev_auth: true,
            jwt_secret: None,
            allowed_origins: vec![],
            calendar_zone: CalendarZone::utc(),
        };
        let roasts = EntryService::new(Arc::new(MemoryStorage::new()), config.calendar_zone);
        build_router(AppState {
            config: Arc::new(config),
            roasts: Arc::new(roasts),
        })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_calendar_requires_token() {
        let app = test_app();
        let (status, body) =
            send(&app, Method::GET, "/calendar?year=2024&month=01", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_create_then_read_calendar() {
        let app = test_app();
        let (status, created) = send(
            &app,
            Method::POST,
            "/calendar",
            Some("dev-alice"),
            Some(json!({ "mood": "excited", "occurredAt": 1_704_067_200_000_i64 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["mood"], "excited");
        assert!(created.get("ownerId").is_none());
        assert!(created.get("year").is_none());

        // Single-digit month is padded at the boundary.
        let (status, view) = send(
            &app,
            Method::GET,
            "/calendar?year=2024&month=1",
            Some("dev-alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view, json!({ "2024": { "01": [created] } }));
    }

    #[tokio::test]
    async fn test_bad_calendar_query_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::GET,
            "/calendar?year=24&month=01",
            Some("dev-alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            Method::GET,
            "/calendar?year=2024&month=13",
            Some("dev-alice"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_mood_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/calendar",
            Some("dev-alice"),
            Some(json!({ "mood": "elated", "occurredAt": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_rejected_with_error_body() {
        let app = test_app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/calendar")
            .header(header::AUTHORIZATION, "Bearer dev-alice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_and_delete_lifecycle() {
        let app = test_app();
        let (_, created) = send(
            &app,
            Method::POST,
            "/calendar",
            Some("dev-alice"),
            Some(json!({ "mood": "tired", "note": "late", "occurredAt": 1_704_067_200_000_i64 })),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/calendar/{id}");

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            Some("dev-alice"),
            Some(json!({ "mood": "ok" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["mood"], "ok");
        assert_eq!(updated["note"], "late");

        let (status, _) = send(&app, Method::DELETE, &uri, Some("dev-alice"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::DELETE, &uri, Some("dev-alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_entry() {
        let app = test_app();
        let (_, created) = send(
            &app,
            Method::POST,
            "/calendar",
            Some("dev-bob"),
            Some(json!({ "mood": "sad", "occurredAt": 1_704_067_200_000_i64 })),
        )
        .await;
        let uri = format!("/calendar/{}", created["id"].as_str().unwrap());

        let (status, _) = send(
            &app,
            Method::PATCH,
            &uri,
            Some("dev-alice"),
            Some(json!({ "mood": "ok" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, view) = send(
            &app,
            Method::GET,
            "/calendar?year=2024&month=01",
            Some("dev-bob"),
            None,
        )
        .await;
        assert_eq!(view["2024"]["01"][0]["mood"], "sad");
    }

    #[tokio::test]
    async fn test_unknown_update_field_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            Method::PATCH,
            "/calendar/anything",
            Some("dev-alice"),
            Some(json!({ "year": "1999" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
