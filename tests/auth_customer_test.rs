mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let app = TestApp::new().await;
    let email = format!("pat-{}@example.com", Uuid::new_v4());

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "first_name": "Pat",
                "last_name": "Driver",
                "email": email,
                "password": "a-long-password",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    // The password hash must never leak through the API
    assert!(body["data"]["customer"].get("password_hash").is_none());

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": email, "password": "a-long-password"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let response = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"].as_str(), Some(email.as_str()));
}

#[tokio::test]
async fn login_with_a_bad_password_is_rejected() {
    let app = TestApp::new().await;
    let email = format!("sam-{}@example.com", Uuid::new_v4());

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({
                "first_name": "Sam",
                "last_name": "Driver",
                "email": email,
                "password": "correct-horse",
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"email": email, "password": "battery-staple"})),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    let email = format!("kim-{}@example.com", Uuid::new_v4());
    let payload = json!({
        "first_name": "Kim",
        "last_name": "Driver",
        "email": email,
        "password": "a-long-password",
    });

    let response = app
        .request(Method::POST, "/api/v1/auth/register", Some(payload.clone()), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(Method::POST, "/api/v1/auth/register", Some(payload), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn vehicle_vin_is_immutable() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle().await;
    let uri = format!(
        "/api/v1/customers/{}/vehicles/{}",
        app.customer_id, vehicle_id
    );

    // Other fields update fine
    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"color": "red"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["color"], "red");

    let response = app
        .request_authenticated(
            Method::PUT,
            &uri,
            Some(json!({"vin": "1HGBH41JXMN109186"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn vehicles_are_scoped_to_their_owner() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle().await;

    // Same vehicle under a different customer id is invisible
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/customers/{}/vehicles/{}", 999_999, vehicle_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customers_with_open_tickets_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let uri = format!("/api/v1/customers/{}", app.customer_id);

    let response = app.request_authenticated(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Cancel the ticket and the delete goes through
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/tickets/{}/status", ticket_id),
            Some(json!({"status": "cancelled"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request_authenticated(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
