mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn ticket_opens_pending_with_no_close_timestamp() {
    let app = TestApp::new().await;
    let (ticket_id, vehicle_id) = app.seed_ticket().await;

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tickets/{}", ticket_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["vehicle_id"].as_i64(), Some(vehicle_id));
    assert_eq!(body["data"]["priority"].as_i64(), Some(3));
    assert!(body["data"]["closed_at"].is_null());
}

#[tokio::test]
async fn completing_a_ticket_stamps_closed_at_exactly_once() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let uri = format!("/api/v1/tickets/{}/status", ticket_id);

    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["closed_at"].is_null());

    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "completed"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(!body["data"]["closed_at"].is_null());

    // Terminal: any further transition is rejected
    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "ticket_closed");
}

#[tokio::test]
async fn pending_cannot_jump_straight_to_completed() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/tickets/{}/status", ticket_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn cancelled_tickets_keep_closed_at_null() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let uri = format!("/api/v1/tickets/{}/status", ticket_id);

    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "cancelled"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "cancelled");
    assert!(body["data"]["closed_at"].is_null());

    // Still terminal
    let response = app
        .request_authenticated(Method::PUT, &uri, Some(json!({"status": "in_progress"})))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn closed_tickets_reject_new_work() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let part_id = app.seed_part(10, 2500).await;
    let mechanic_id = app.seed_mechanic("Maria").await;

    let status_uri = format!("/api/v1/tickets/{}/status", ticket_id);
    for status in ["in_progress", "completed"] {
        let response = app
            .request_authenticated(Method::PUT, &status_uri, Some(json!({"status": status})))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/line-items", ticket_id),
            Some(json!({
                "description": "Brake inspection",
                "quantity": "1",
                "unit_price_cents": 4500,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "ticket_closed");

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/parts", ticket_id),
            Some(json!({"part_id": part_id, "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "ticket_closed");

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/assign-mechanic", ticket_id),
            Some(json!({"mechanic_id": mechanic_id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "ticket_closed");

    // Stock was untouched by the rejected part attach
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/parts/{}", part_id), None)
        .await;
    assert_eq!(
        body_json(response).await["data"]["quantity_in_stock"].as_i64(),
        Some(10)
    );
}

#[tokio::test]
async fn standard_brake_job_total_adds_labor_and_marked_up_parts() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let part_id = app.seed_part(10, 2500).await;

    // Labor: 2 hours at $35.00/hr
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/line-items", ticket_id),
            Some(json!({
                "description": "Brake pad replacement",
                "quantity": "2",
                "unit_price_cents": 3500,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // One $25.00 part at the default 30% markup
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/parts", ticket_id),
            Some(json!({"part_id": part_id, "quantity": 1})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/tickets/{}/total", ticket_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["labor_cents"].as_i64(), Some(7000));
    assert_eq!(body["data"]["parts_cents"].as_i64(), Some(3250));
    assert_eq!(body["data"]["total_cents"].as_i64(), Some(10250));

    // Attaching the part consumed stock
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/parts/{}", part_id), None)
        .await;
    assert_eq!(
        body_json(response).await["data"]["quantity_in_stock"].as_i64(),
        Some(9)
    );
}

#[tokio::test]
async fn ticket_requires_a_vehicle_owned_by_the_customer() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/tickets",
            Some(json!({
                "customer_id": app.customer_id + 999,
                "vehicle_id": vehicle_id,
                "problem_description": "Rattle over bumps",
                "odometer_miles": 61_000,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/tickets",
            Some(json!({
                "customer_id": app.customer_id,
                "vehicle_id": 999_999,
                "problem_description": "Rattle over bumps",
                "odometer_miles": 61_000,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn line_items_reject_unknown_services() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let uri = format!("/api/v1/tickets/{}/line-items", ticket_id);

    let response = app
        .request_authenticated(
            Method::POST,
            &uri,
            Some(json!({
                "service_id": 999_999,
                "description": "Phantom service",
                "quantity": "1",
                "unit_price_cents": 4500,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");

    // Nothing was persisted by the rejected request
    let response = app.request_authenticated(Method::GET, &uri, None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(0));
}

#[tokio::test]
async fn service_lines_price_from_the_catalog_by_default() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let service_id = app.seed_service(4500).await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/line-items", ticket_id),
            Some(json!({
                "service_id": service_id,
                "description": "Tire rotation",
                "quantity": "1",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["unit_price_cents"].as_i64(), Some(4500));
    assert_eq!(body["data"]["line_type"], "service");

    // An explicit price still overrides the catalog default
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/line-items", ticket_id),
            Some(json!({
                "service_id": service_id,
                "description": "Discounted rotation",
                "quantity": "1",
                "unit_price_cents": 4000,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["data"]["unit_price_cents"].as_i64(),
        Some(4000)
    );
}

#[tokio::test]
async fn adhoc_lines_require_an_explicit_price() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/line-items", ticket_id),
            Some(json!({
                "description": "Shop supplies",
                "quantity": "1",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn racing_completions_stamp_closed_at_only_once() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/tickets/{}/status", ticket_id),
            Some(json!({"status": "in_progress"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let complete = || {
        app.state.services.tickets.update_status(
            ticket_id,
            autoshop_api::services::tickets::UpdateTicketStatusRequest {
                status: "completed".to_string(),
            },
        )
    };
    let (first, second) = tokio::join!(complete(), complete());
    let successes = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(successes, 1, "exactly one completion should win");

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tickets/{}", ticket_id), None)
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(!body["data"]["closed_at"].is_null());
}

#[tokio::test]
async fn parts_record_their_installer_when_given() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let part_id = app.seed_part(5, 2500).await;
    let mechanic_id = app.seed_mechanic("Quinn").await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/parts", ticket_id),
            Some(json!({
                "part_id": part_id,
                "quantity": 1,
                "installed_by_mechanic_id": mechanic_id,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await["data"]["installed_by_mechanic_id"].as_i64(),
        Some(mechanic_id)
    );

    // An unknown installer fails the whole attachment
    let other_part = app.seed_part(5, 2500).await;
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/parts", ticket_id),
            Some(json!({
                "part_id": other_part,
                "quantity": 1,
                "installed_by_mechanic_id": 999_999,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/parts/{}", other_part), None)
        .await;
    assert_eq!(
        body_json(response).await["data"]["quantity_in_stock"].as_i64(),
        Some(5)
    );
}

#[tokio::test]
async fn listing_tickets_rejects_unknown_status_filters() {
    let app = TestApp::new().await;
    app.seed_ticket().await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/tickets?status=exploded", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/tickets?status=pending", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["items"].as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/tickets", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
