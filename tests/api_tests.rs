use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wardennet::config::Config;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    // The in-memory database is per-connection; a pool of one keeps
    // every query on the same database.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config.scheduler.enabled = false;
    config.observability.metrics_enabled = false;
    config
}

async fn spawn_app() -> Router {
    let state = wardennet::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("Failed to create app state");
    wardennet::api::router(state).await
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("session={token}"));
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_token(response: &Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("session="), "unexpected cookie: {cookie}");
    cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Registers a user and returns (session token, user id).
async fn register_user(app: &Router, email: &str, password: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            serde_json::json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token = session_token(&response);
    let body = body_json(response).await;
    let user_id = body["data"]["id"].as_str().unwrap().to_string();
    (token, user_id)
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_authentication() {
    let app = spawn_app().await;

    for uri in ["/api/cases", "/api/criminals", "/api/system/status"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cases")
                .header(header::COOKIE, "session=bogus-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_case_lifecycle() {
    let app = spawn_app().await;

    // Register
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            serde_json::json!({"email": "alice@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["success"].as_bool().unwrap());
    let alice_id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(!alice_id.is_empty());

    // Login with the same credentials
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({"email": "alice@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = session_token(&response);
    assert_eq!(token.len(), 64);

    // Empty case list
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/cases", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Create a case
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/cases",
            &token,
            Some(serde_json::json!({"title": "T", "description": "D"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["createdBy"].as_str().unwrap(), alice_id);
    assert_eq!(body["data"]["status"].as_str().unwrap(), "open");
    assert!(
        body["data"]["caseNumber"]
            .as_str()
            .unwrap()
            .starts_with("CASE-")
    );
    let case_id = body["data"]["id"].as_str().unwrap().to_string();

    // The case shows up in the list
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/cases", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // A different user cannot see or delete it
    let (bob_token, _) = register_user(&app, "bob@example.com", "Password456!").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/api/cases/{case_id}"),
            &bob_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/cases/{case_id}"),
            &bob_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner can delete it
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/cases/{case_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn case_validation_failures_write_nothing() {
    let app = spawn_app().await;
    let (token, _) = register_user(&app, "carol@example.com", "Password123!").await;

    // Missing description
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/cases",
            &token,
            Some(serde_json::json!({"title": "T", "description": ""})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Whitespace-only title
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/cases",
            &token,
            Some(serde_json::json!({"title": "   ", "description": "D"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Invalid status value
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/cases",
            &token,
            Some(serde_json::json!({"title": "T", "description": "D", "status": "bogus"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was written
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/cases", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = spawn_app().await;
    register_user(&app, "dave@example.com", "Password123!").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            serde_json::json!({"email": "dave@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_registration_input_rejected() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/register",
            serde_json::json!({"email": "not-an-email", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/register",
            serde_json::json!({"email": "ok@example.com", "password": "short"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failure_is_opaque() {
    let app = spawn_app().await;
    register_user(&app, "erin@example.com", "Password123!").await;

    // Wrong password and unknown email look identical
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({"email": "erin@example.com", "password": "WrongPassword"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({"email": "nobody@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let app = spawn_app().await;
    let (token, _) = register_user(&app, "frank@example.com", "Password123!").await;

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/logout", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/cases", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging out again with the dead token still succeeds
    let response = app
        .oneshot(authed_request("POST", "/api/logout", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bearer_token_works_like_cookie() {
    let app = spawn_app().await;
    let (token, user_id) = register_user(&app, "grace@example.com", "Password123!").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"].as_str().unwrap(), user_id);
    assert_eq!(body["data"]["email"].as_str().unwrap(), "grace@example.com");
}

#[tokio::test]
async fn update_profile_changes_name_and_bio() {
    let app = spawn_app().await;
    let (token, _) = register_user(&app, "judy@example.com", "Password123!").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            "/api/auth/me",
            &token,
            Some(serde_json::json!({"name": "Judy", "bio": "Senior prosecutor"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"].as_str().unwrap(), "Judy");
    assert_eq!(body["data"]["bio"].as_str().unwrap(), "Senior prosecutor");

    // Blank name is rejected
    let response = app
        .oneshot(authed_request(
            "PUT",
            "/api/auth/me",
            &token,
            Some(serde_json::json!({"name": "  "})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_requires_current() {
    let app = spawn_app().await;
    let (token, _) = register_user(&app, "heidi@example.com", "Password123!").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            "/api/auth/password",
            &token,
            Some(serde_json::json!({
                "currentPassword": "WrongPassword",
                "newPassword": "NewPassword456!"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            "/api/auth/password",
            &token,
            Some(serde_json::json!({
                "currentPassword": "Password123!",
                "newPassword": "NewPassword456!"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({"email": "heidi@example.com", "password": "Password123!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            serde_json::json!({"email": "heidi@example.com", "password": "NewPassword456!"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn system_status_reports_counts() {
    let app = spawn_app().await;
    let (token, _) = register_user(&app, "ivan@example.com", "Password123!").await;

    app.clone()
        .oneshot(authed_request(
            "POST",
            "/api/cases",
            &token,
            Some(serde_json::json!({"title": "T", "description": "D"})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(authed_request("GET", "/api/system/status", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["cases"].as_u64().unwrap(), 1);
    assert!(body["data"]["version"].is_string());
}
