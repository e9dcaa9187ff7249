//! 注册服务路由模块

use axum::{
    routing::{delete, get},
    Router,
};

use crate::handlers::{
    delete_registration, get_record, health_check, list_records, register_record, test_record,
};
use crate::state::AppState;

/// 创建服务记录路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/records", get(list_records).post(register_record))
        .route("/api/records/{name}", get(get_record))
        .route("/api/records/{name}/test", get(test_record))
        .route("/api/registrations/{id}", delete(delete_registration))
        .route("/api/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use common::config::AppConfig;
    use jdbc_service::{InMemoryRegistry, JdbcService, StaticSecretResolver};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let service = JdbcService::new(
            Arc::new(StaticSecretResolver::new("app", "s3cret")),
            Arc::new(InMemoryRegistry::default()),
        );
        router().with_state(AppState::with_service(AppConfig::default(), service))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_register_lookup_and_test() {
        let app = app();
        let config = json!({
            "url": "jdbc:sqlite::memory:",
            "driver_class": "org.sqlite.JDBC",
            "password": "caller-supplied"
        });

        let (status, body) = send(&app, Method::POST, "/api/records", Some(config)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "jdbc-service");
        assert_eq!(body["data"]["options"]["username"], "app");
        assert!(body["data"]["options"].get("password").is_none());

        let (status, body) = send(&app, Method::GET, "/api/records/jdbc-service", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "UP");

        let (status, body) = send(&app, Method::GET, "/api/records/jdbc-service/test", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["success"], true);
        assert_eq!(body["data"]["driver"], "sqlite");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/records",
            Some(json!({ "driver_class": "org.sqlite.JDBC" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("'url'"));

        let (_, body) = send(&app, Method::GET, "/api/records", None).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_service_is_not_found() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/records/jdbc-service/test", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "SERVICE_NOT_FOUND");
        assert!(body["error"]["message"].as_str().unwrap().contains("jdbc-service"));
    }

    #[tokio::test]
    async fn test_unpublish_by_registration() {
        let app = app();
        let config = json!({ "url": "jdbc:sqlite::memory:", "driver_class": "org.sqlite.JDBC" });
        let (_, body) = send(&app, Method::POST, "/api/records", Some(config)).await;
        let registration = body["data"]["registration"].as_str().unwrap().to_string();

        let uri = format!("/api/registrations/{}", registration);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "REGISTRATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_responses_carry_configured_service_name() {
        let config = AppConfig {
            service_name: "orders-registry".to_string(),
            ..AppConfig::default()
        };
        let service = JdbcService::new(
            Arc::new(StaticSecretResolver::new("app", "s3cret")),
            Arc::new(InMemoryRegistry::default()),
        );
        let app = router().with_state(AppState::with_service(config, service));

        let (_, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(body["service"], "orders-registry");

        let (_, body) = send(&app, Method::GET, "/api/records", None).await;
        assert_eq!(body["meta"]["service"], "orders-registry");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["records"], 0);
    }
}
