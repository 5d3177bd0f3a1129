mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;

use autoshop_api::errors::ServiceError;
use autoshop_api::services::inventory::CreatePartRequest;

fn part_request(part_number: &str, stock: i32, reorder_level: Option<i32>) -> CreatePartRequest {
    CreatePartRequest {
        part_number: part_number.to_string(),
        name: "Oil filter".to_string(),
        description: None,
        category: Some("Filters".to_string()),
        manufacturer: None,
        supplier: None,
        current_cost_cents: 899,
        quantity_in_stock: stock,
        reorder_level,
    }
}

#[tokio::test]
async fn consume_decrements_stock_and_guards_against_overdraw() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    let part = inventory
        .create_part(part_request("FIL-001", 5, Some(2)))
        .await
        .expect("create part");

    let after = inventory
        .consume(&*app.state.db, part.id, 3)
        .await
        .expect("consume within stock");
    assert_eq!(after.quantity_in_stock, 2);

    let err = inventory
        .consume(&*app.state.db, part.id, 3)
        .await
        .expect_err("overdraw must fail");
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Failed consume left the stock untouched
    let part = inventory.get_part(part.id).await.expect("get part");
    assert_eq!(part.quantity_in_stock, 2);
}

#[tokio::test]
async fn consume_of_missing_part_reports_not_found() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .inventory
        .consume(&*app.state.db, 424_242, 1)
        .await
        .expect_err("missing part must fail");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn restock_raises_stock_level() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    let part = inventory
        .create_part(part_request("FIL-002", 1, Some(2)))
        .await
        .expect("create part");

    let restocked = inventory.restock(part.id, 7).await.expect("restock");
    assert_eq!(restocked.quantity_in_stock, 8);
}

#[tokio::test]
async fn negative_adjustment_cannot_push_stock_below_zero() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    let part = inventory
        .create_part(part_request("FIL-003", 4, None))
        .await
        .expect("create part");

    let adjustment = inventory
        .adjust_quantity(part.id, -4)
        .await
        .expect("adjust to zero");
    assert_eq!(adjustment.previous_quantity, 4);
    assert_eq!(adjustment.new_quantity, 0);

    let err = inventory
        .adjust_quantity(part.id, -1)
        .await
        .expect_err("stock must not go negative");
    assert_matches!(err, ServiceError::InsufficientStock(_));
}

#[tokio::test]
async fn low_stock_listing_uses_the_reorder_level_inclusively() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    // At the level counts as low; above it does not
    let low = inventory
        .create_part(part_request("FIL-010", 2, Some(2)))
        .await
        .expect("create low part");
    let healthy = inventory
        .create_part(part_request("FIL-011", 3, Some(2)))
        .await
        .expect("create healthy part");

    let low_stock = inventory.list_low_stock().await.expect("list low stock");
    let ids: Vec<i64> = low_stock.iter().map(|p| p.id).collect();
    assert!(ids.contains(&low.id));
    assert!(!ids.contains(&healthy.id));
}

#[tokio::test]
async fn adjust_quantity_endpoint_round_trips() {
    let app = TestApp::new().await;
    let part_id = app.seed_part(10, 1500).await;
    let uri = format!("/api/v1/parts/{}/adjust-quantity", part_id);

    let response = app
        .request_authenticated(
            Method::POST,
            &uri,
            Some(json!({"delta": -4, "reason": "damaged in storage"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["previous_quantity"].as_i64(), Some(10));
    assert_eq!(body["data"]["new_quantity"].as_i64(), Some(6));

    let response = app
        .request_authenticated(Method::POST, &uri, Some(json!({"delta": -7})))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "insufficient_stock");
}

#[tokio::test]
async fn attaching_more_parts_than_stocked_is_rejected() {
    let app = TestApp::new().await;
    let (ticket_id, _) = app.seed_ticket().await;
    let part_id = app.seed_part(2, 2500).await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/tickets/{}/parts", ticket_id),
            Some(json!({"part_id": part_id, "quantity": 3})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "insufficient_stock");

    // Nothing was consumed by the failed attach
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/parts/{}", part_id), None)
        .await;
    assert_eq!(
        body_json(response).await["data"]["quantity_in_stock"].as_i64(),
        Some(2)
    );
}

#[tokio::test]
async fn duplicate_part_numbers_are_rejected() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    inventory
        .create_part(part_request("FIL-DUP", 1, None))
        .await
        .expect("first create");
    let err = inventory
        .create_part(part_request("FIL-DUP", 1, None))
        .await
        .expect_err("duplicate part number must fail");
    assert_matches!(err, ServiceError::Conflict(_));
}
