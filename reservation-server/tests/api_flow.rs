//! HTTP-level tests for the auth and profile flows.
//! Run: cargo test -p reservation-server --test api_flow

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use reservation_server::core::{Config, ServerState};

async fn test_app() -> (Router, ServerState, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
    let state = ServerState::initialize(&config).await.unwrap();
    let app = reservation_server::api::build_app(&state);
    (app, state, tmp)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: http::Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_payload() -> Value {
    json!({
        "firstName": "Ana",
        "lastName": "Silva",
        "email": "ana@example.com",
        "phone": "+351900000001",
        "password": "hunter42"
    })
}

#[tokio::test]
async fn health_is_public() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_reject_missing_and_bad_tokens() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/reservations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(bearer_request("GET", "/api/reservations", "not-a-jwt", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_verify_login_round_trip() {
    let (app, state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["user"]["isVerified"], false);

    // Unverified accounts cannot log in
    let login = json!({"identifier": "ana@example.com", "password": "hunter42"});
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", login.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Pull the verification token straight from the database
    let account = state
        .users()
        .find_by_email("ana@example.com")
        .await
        .unwrap()
        .unwrap();
    let token = account.verification_token.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/auth/verify?token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Email works as identifier
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/login", login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let access = body["token"].as_str().unwrap().to_string();
    let refresh = body["refreshToken"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "ana@example.com");

    // So does the phone number
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"identifier": "+351900000001", "password": "hunter42"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password gets the unified credentials error
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            json!({"identifier": "ana@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The access token opens protected routes
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/users/me", &access, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["firstName"], "Ana");

    // A refresh token is not an access token
    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/users/me", &refresh, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // But it mints a fresh usable pair
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            json!({"refreshToken": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let new_access = body["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(bearer_request("GET", "/api/users/me", &new_access, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", register_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn oauth_login_creates_a_verified_account() {
    let (app, _state, _tmp) = test_app().await;

    let payload = json!({
        "provider": "google",
        "email": "bob@example.com",
        "firstName": "Bob",
        "lastName": "Santos",
        "oauthId": "google-123"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/oauth", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let first_id = body["user"]["id"].as_str().unwrap().to_string();
    assert!(body["token"].is_string());

    // Second OAuth login reuses the account
    let response = app
        .oneshot(json_request("POST", "/api/auth/oauth", payload))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user"]["id"].as_str().unwrap(), first_id);
}

#[tokio::test]
async fn subscription_mock_payment_flow() {
    let (app, state, _tmp) = test_app().await;

    // Verified user via OAuth shortcut
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/oauth",
            json!({
                "provider": "google",
                "email": "carla@example.com",
                "firstName": "Carla",
                "lastName": "Mota",
                "oauthId": "google-456"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Incomplete form
    let response = app
        .clone()
        .oneshot(bearer_request(
            "POST",
            "/api/users/subscription/activate",
            &token,
            Some(json!({"cardNumber": "", "cardHolder": "Carla", "expiry": "12/30", "cvc": "123"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Card number too short
    let response = app
        .clone()
        .oneshot(bearer_request(
            "POST",
            "/api/users/subscription/activate",
            &token,
            Some(json!({"cardNumber": "4111 1111", "cardHolder": "Carla", "expiry": "12/30", "cvc": "123"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid demo card
    let response = app
        .clone()
        .oneshot(bearer_request(
            "POST",
            "/api/users/subscription/activate",
            &token,
            Some(json!({"cardNumber": "4111 1111 1111 1111", "cardHolder": "Carla", "expiry": "12/30", "cvc": "123"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subscription"]["tier"], "premium");
    assert_eq!(body["subscription"]["status"], "active");
    assert!(body["subscription"]["expiresAt"].is_i64());

    let account = state
        .users()
        .find_by_email("carla@example.com")
        .await
        .unwrap()
        .unwrap();
    let started = account.subscription.started_at.unwrap();
    let expires = account.subscription.expires_at.unwrap();
    assert_eq!(expires - started, 365 * 24 * 60 * 60 * 1000);

    // Cancel resets to the free tier
    let response = app
        .oneshot(bearer_request(
            "POST",
            "/api/users/subscription/cancel",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["subscription"]["tier"], "free");
    assert_eq!(body["subscription"]["status"], "inactive");
    assert!(body["subscription"].get("startedAt").is_none());
}

#[tokio::test]
async fn reservation_endpoints_round_trip() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/oauth",
            json!({
                "provider": "google",
                "email": "dan@example.com",
                "firstName": "Dan",
                "lastName": "Reis",
                "oauthId": "google-789"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let date = (chrono::Utc::now() + chrono::Duration::days(2))
        .format("%Y-%m-%d")
        .to_string();
    let response = app
        .clone()
        .oneshot(bearer_request(
            "POST",
            "/api/reservations",
            &token,
            Some(json!({
                "floorplanId": "fp-rooftop",
                "tableId": "r2",
                "date": date,
                "timeSlot": "20:00",
                "guests": 4,
                "note": "window please"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["reservation"]["status"], "pending");
    assert_eq!(body["reservation"]["tableName"], "Rooftop Lounge · R2");
    let rid = body["reservation"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/reservations", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reservations"].as_array().unwrap().len(), 1);
    assert!(body["favorites"].as_array().unwrap().is_empty());

    // Invalid guest count is rejected
    let response = app
        .clone()
        .oneshot(bearer_request(
            "POST",
            "/api/reservations",
            &token,
            Some(json!({
                "floorplanId": "fp-rooftop",
                "tableId": "r2",
                "date": date,
                "timeSlot": "21:00",
                "guests": 0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Cancel through the API
    let response = app
        .clone()
        .oneshot(bearer_request(
            "DELETE",
            &format!("/api/reservations/{}", rid),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reservation"]["status"], "cancelled");
}

#[tokio::test]
async fn floorplan_catalog_and_availability() {
    let (app, _state, _tmp) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/oauth",
            json!({
                "provider": "google",
                "email": "eva@example.com",
                "firstName": "Eva",
                "lastName": "Luz",
                "oauthId": "google-000"
            }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(bearer_request("GET", "/api/floorplans", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let floorplans = body["floorplans"].as_array().unwrap();
    assert_eq!(floorplans.len(), 2);
    assert_eq!(floorplans[0]["id"], "fp-main-hall");

    let response = app
        .clone()
        .oneshot(bearer_request(
            "GET",
            "/api/floorplans/fp-rooftop/availability",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["floorplanId"], "fp-rooftop");
    assert_eq!(body["availability"].as_array().unwrap().len(), 5);

    let response = app
        .oneshot(bearer_request(
            "GET",
            "/api/floorplans/fp-missing/availability",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
