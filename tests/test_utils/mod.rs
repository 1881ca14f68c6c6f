//! Test utilities for integration tests
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};

use calendar_proxy::api::AppState;
use calendar_proxy::api::app;
use calendar_proxy::core::AppConfig;

/// Service account JSON whose token endpoint lives on `server_url`
pub fn test_credentials_json(server_url: &str) -> String {
    let private_key = fs::read_to_string("./tests/data/test_service_account_key.pem")
        .expect("Failed to read test private key");
    serde_json::json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "test-key-id",
        "private_key": private_key,
        "client_email": "calendar-reader@test-project.iam.gserviceaccount.com",
        "client_id": "1234567890",
        "token_uri": format!("{}/token", server_url),
    })
    .to_string()
}

/// Creates a test application router that talks to a mock Google
/// server at `server_url` for both tokens and calendar data.
pub fn test_app(server_url: &str, credentials_json: Option<String>) -> Router {
    let app_config = AppConfig {
        google_credentials_json: credentials_json,
        calendar_api_url: server_url.to_string(),
        request_timeout: Duration::from_secs(5),
        ..AppConfig::default()
    };
    let app_state = AppState::new(app_config);
    app(Arc::new(app_state))
}

/// Mock a successful token exchange
pub async fn mock_token(server: &mut mockito::Server) -> mockito::Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "test_token", "expires_in": 3600, "token_type": "Bearer"}"#)
        .create_async()
        .await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
