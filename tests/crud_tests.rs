use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wardennet::config::Config;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config.scheduler.enabled = false;
    config.observability.metrics_enabled = false;

    let state = wardennet::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    wardennet::api::router(state).await
}

async fn login_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/register")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "prosecutor@example.com",
                        "password": "Password123!"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
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

async fn create_criminal(app: &Router, token: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/criminals",
            token,
            Some(serde_json::json!({
                "firstName": "John",
                "lastName": "Doe",
                "aliases": ["JD"],
                "threatLevel": "high"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_statute(app: &Router, token: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/statutes",
            token,
            Some(serde_json::json!({
                "title": "Grand Larceny",
                "sectionNumber": "155.40"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_case(app: &Router, token: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/cases",
            token,
            Some(serde_json::json!({"title": "T", "description": "D"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn criminal_crud_roundtrip() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let id = create_criminal(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/criminals/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["firstName"].as_str().unwrap(), "John");
    assert_eq!(body["data"]["threatLevel"].as_str().unwrap(), "high");
    assert_eq!(body["data"]["status"].as_str().unwrap(), "active");
    assert_eq!(body["data"]["aliases"][0].as_str().unwrap(), "JD");

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/criminals/{id}"),
            &token,
            Some(serde_json::json!({"status": "incarcerated"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"].as_str().unwrap(), "incarcerated");

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/criminals/{id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", &format!("/api/criminals/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn criminal_requires_names() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/criminals",
            &token,
            Some(serde_json::json!({"firstName": "", "lastName": "Doe"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            "POST",
            "/api/criminals",
            &token,
            Some(serde_json::json!({"firstName": "John", "lastName": "Doe", "threatLevel": "extreme"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evidence_requires_existing_case() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/evidence",
            &token,
            Some(serde_json::json!({"caseId": "no-such-case", "title": "Knife"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let case_id = create_case(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/evidence",
            &token,
            Some(serde_json::json!({
                "caseId": case_id,
                "title": "Knife",
                "tags": ["weapon", "recovered"]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["caseId"].as_str().unwrap(), case_id);
    assert_eq!(body["data"]["tags"][0].as_str().unwrap(), "weapon");

    // Filtered listing
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/evidence?case_id={case_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Unknown case filter is a 404
    let response = app
        .oneshot(request(
            "GET",
            "/api/evidence?case_id=no-such-case",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn evidence_cascades_with_case() {
    let app = spawn_app().await;
    let token = login_token(&app).await;
    let case_id = create_case(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/evidence",
            &token,
            Some(serde_json::json!({"caseId": case_id, "title": "Ledger"})),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let evidence_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/cases/{case_id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/evidence/{evidence_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn statute_crud_roundtrip() {
    let app = spawn_app().await;
    let token = login_token(&app).await;

    let id = create_statute(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/statutes", &token, None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/statutes/{id}"),
            &token,
            Some(serde_json::json!({"description": "Theft above the felony threshold"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["description"].as_str().unwrap(),
        "Theft above the felony threshold"
    );

    let response = app
        .oneshot(request("DELETE", &format!("/api/statutes/{id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn crime_links_require_existing_records() {
    let app = spawn_app().await;
    let token = login_token(&app).await;
    let criminal_id = create_criminal(&app, &token).await;
    let statute_id = create_statute(&app, &token).await;

    // Unknown criminal
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/crimes",
            &token,
            Some(serde_json::json!({
                "criminalId": "nope",
                "statuteId": statute_id,
                "name": "Larceny"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown statute
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/crimes",
            &token,
            Some(serde_json::json!({
                "criminalId": criminal_id,
                "statuteId": "nope",
                "name": "Larceny"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Unknown case
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/crimes",
            &token,
            Some(serde_json::json!({
                "criminalId": criminal_id,
                "statuteId": statute_id,
                "caseId": "nope",
                "name": "Larceny"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // All references valid
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/crimes",
            &token,
            Some(serde_json::json!({
                "criminalId": criminal_id,
                "statuteId": statute_id,
                "name": "Larceny",
                "chargeLevel": "felony"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"].as_str().unwrap(), "pending");
    let crime_id = body["data"]["id"].as_str().unwrap().to_string();

    // Listed under the criminal
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/criminals/{criminal_id}/crimes"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["id"].as_str().unwrap(), crime_id);

    // Deleting the criminal cascades to the crime record
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/criminals/{criminal_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", &format!("/api/crimes/{crime_id}"), &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crime_status_transitions_validated() {
    let app = spawn_app().await;
    let token = login_token(&app).await;
    let criminal_id = create_criminal(&app, &token).await;
    let statute_id = create_statute(&app, &token).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/crimes",
            &token,
            Some(serde_json::json!({
                "criminalId": criminal_id,
                "statuteId": statute_id,
                "name": "Larceny"
            })),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let crime_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/crimes/{crime_id}"),
            &token,
            Some(serde_json::json!({"status": "bogus"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // "dismissed" is not part of the vocabulary; acquitted is.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/crimes/{crime_id}"),
            &token,
            Some(serde_json::json!({"status": "dismissed"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for status in ["charged", "convicted", "acquitted"] {
        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/crimes/{crime_id}"),
                &token,
                Some(serde_json::json!({"status": status})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"].as_str().unwrap(), status);
    }
}
