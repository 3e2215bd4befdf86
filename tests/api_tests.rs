//! Request-level tests: authentication gate, field validation, and the
//! legacy envelope shape. These run against a lazy pool, so every asserted
//! path must reject before reaching the database.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{create_test_app, create_test_state, issue_test_token};
use serde_json::{json, Value};

fn server() -> (TestServer, String) {
    let state = create_test_state();
    let token = issue_test_token(&state);
    let server = TestServer::new(create_test_app(state)).unwrap();
    (server, token)
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = server();
    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (server, _) = server();
    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"].is_object());
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (server, _) = server();
    let response = server
        .post("/api/crud/role/createRole")
        .json(&json!({"name": "Admin"}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["resultKey"], false);
    assert_eq!(body["errorMessage"], "Access denied. No token provided.");
    assert_eq!(body["errorCode"], 401);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let (server, _) = server();
    let response = server
        .post("/api/crud/role/createRole")
        .authorization_bearer("not-a-real-token")
        .json(&json!({"name": "Admin"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["resultKey"], false);
    assert_eq!(body["errorMessage"], "Invalid token.");
    assert_eq!(body["errorCode"], 403);
}

#[tokio::test]
async fn test_console_routes_require_token() {
    let (server, _) = server();
    let response = server.get("/api/superadmin/logs").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_role_missing_name() {
    let (server, token) = server();
    let response = server
        .post("/api/crud/role/createRole")
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["resultKey"], false);
    assert_eq!(body["errorMessage"], "Missing required field: name");
    assert_eq!(body["errorCode"], 400);
}

#[tokio::test]
async fn test_update_role_missing_active_flag() {
    let (server, token) = server();
    let response = server
        .put("/api/crud/role/updateRole/1")
        .authorization_bearer(&token)
        .json(&json!({"name": "Ops"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errorMessage"], "Missing required field: isActive");
}

#[tokio::test]
async fn test_create_site_reports_first_missing_field() {
    let (server, token) = server();
    let response = server
        .post("/api/crud/site/createSite")
        .authorization_bearer(&token)
        .json(&json!({"name": "Main"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errorMessage"], "Missing required field: url");
}

#[tokio::test]
async fn test_create_access_missing_role_id() {
    let (server, token) = server();
    let response = server
        .post("/api/crud/access/createAccess")
        .authorization_bearer(&token)
        .json(&json!({"web_access": true, "app_access": false}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errorMessage"], "Missing required field: role_id");
}

#[tokio::test]
async fn test_create_event_requires_all_fields() {
    let (server, _) = server();
    let response = server
        .post("/api/crud/event/createEvent")
        .json(&json!({"name": "Launch"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["errorMessage"],
        "Event name, date, and location are required"
    );
}

#[tokio::test]
async fn test_signup_requires_profile_fields() {
    let (server, _) = server();
    let response = server
        .post("/api/crud/user/createUser")
        .json(&json!({
            "username": "jdoe",
            "password": "secret",
            "role_id": 1,
            "email": "jdoe@example.com"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errorMessage"], "Missing required field: birthday");
}
