mod common;

use assert_matches::assert_matches;
use common::TestApp;

use autoshop_api::errors::ServiceError;
use autoshop_api::services::inventory::CreatePartRequest;

/// Twenty tasks race to consume one unit each from a stock of ten. The
/// conditional decrement must let exactly ten through and leave the
/// stock at zero, never negative.
#[tokio::test]
async fn concurrent_consumes_never_oversell() {
    let app = TestApp::new().await;
    let inventory = app.state.services.inventory.clone();

    let part = inventory
        .create_part(CreatePartRequest {
            part_number: "RACE-001".to_string(),
            name: "Spark plug".to_string(),
            description: None,
            category: None,
            manufacturer: None,
            supplier: None,
            current_cost_cents: 450,
            quantity_in_stock: 10,
            reorder_level: Some(0),
        })
        .await
        .expect("create part");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let inventory = inventory.clone();
        let db = app.state.db.clone();
        let part_id = part.id;
        handles.push(tokio::spawn(async move {
            inventory.consume(&*db, part_id, 1).await
        }));
    }

    let mut successes = 0;
    let mut failures = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(err) => {
                assert_matches!(err, ServiceError::InsufficientStock(_));
                failures += 1;
            }
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(failures, 10);

    let part = inventory.get_part(part.id).await.expect("get part");
    assert_eq!(part.quantity_in_stock, 0);
}

/// Interleaved restocks and consumes keep the ledger consistent.
#[tokio::test]
async fn mixed_adjustments_settle_to_the_expected_level() {
    let app = TestApp::new().await;
    let inventory = app.state.services.inventory.clone();

    let part = inventory
        .create_part(CreatePartRequest {
            part_number: "RACE-002".to_string(),
            name: "Wiper blade".to_string(),
            description: None,
            category: None,
            manufacturer: None,
            supplier: None,
            current_cost_cents: 1200,
            quantity_in_stock: 0,
            reorder_level: Some(0),
        })
        .await
        .expect("create part");

    let mut handles = Vec::new();
    for _ in 0..5 {
        let inventory = inventory.clone();
        let part_id = part.id;
        handles.push(tokio::spawn(async move {
            inventory.restock(part_id, 2).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("restock failed");
    }

    let mut handles = Vec::new();
    for _ in 0..3 {
        let inventory = inventory.clone();
        let db = app.state.db.clone();
        let part_id = part.id;
        handles.push(tokio::spawn(async move {
            inventory.consume(&*db, part_id, 2).await.map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").expect("consume failed");
    }

    let part = inventory.get_part(part.id).await.expect("get part");
    assert_eq!(part.quantity_in_stock, 4);
}
