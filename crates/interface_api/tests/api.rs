//! HTTP API integration tests
//!
//! Exercises the full router over an in-memory store and journal; only the
//! readiness endpoint needs a real database, so it is not covered here.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;

use domain_bill::{BillFlowClient, BillService, BillStore};
use durable_flow::{FlowRegistry, MemoryJournal};
use interface_api::{create_router, AppState};
use test_utils::MemoryBillStore;

fn test_server() -> TestServer {
    let registry = FlowRegistry::new(Arc::new(MemoryJournal::new()));
    let store: Arc<dyn BillStore> = Arc::new(MemoryBillStore::new());
    let flows = BillFlowClient::new(registry, store.clone());
    let service = Arc::new(BillService::new(store, Arc::new(flows)));
    // The handlers under test never touch the pool, so a lazy pool that
    // never connects is enough to satisfy the state.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/billing_test")
        .expect("lazy pool");
    TestServer::new(create_router(AppState { service, pool })).expect("test server")
}

async fn create_bill(server: &TestServer, customer_id: &str, currency: &str) -> String {
    let response = server
        .post("/bills")
        .json(&json!({ "customerId": customer_id, "currency": currency }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["billId"].as_str().expect("billId").to_string()
}

/// Polls the bill until it reports the closed status, returning its final
/// representation. The close transition runs in the workflow task, so the
/// read-side flips asynchronously.
async fn wait_until_closed(server: &TestServer, bill_id: &str) -> Value {
    for _ in 0..100 {
        let response = server.get(&format!("/bills/{bill_id}")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        if body["status"] == "CLOSED" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("bill {bill_id} never closed");
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_bill_returns_prefixed_id() {
    let server = test_server();
    let bill_id = create_bill(&server, "customer-1", "USD").await;
    assert!(bill_id.starts_with("bill-customer-1-"));
}

#[tokio::test]
async fn create_bill_rejects_unknown_currency() {
    let server = test_server();
    let response = server
        .post("/bills")
        .json(&json!({ "customerId": "customer-1", "currency": "EUR" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn create_bill_rejects_blank_customer() {
    let server = test_server();
    let response = server
        .post("/bills")
        .json(&json!({ "customerId": "   ", "currency": "GEL" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    let listing = server.get("/bills").await;
    listing.assert_status_ok();
    let body: Value = listing.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn add_line_item_accepts_valid_item() {
    let server = test_server();
    let bill_id = create_bill(&server, "customer-1", "USD").await;

    let response = server
        .post(&format!("/bills/{bill_id}/items"))
        .json(&json!({ "description": "subscription", "amount": 1500 }))
        .await;
    response.assert_status_ok();

    let bill: Value = server.get(&format!("/bills/{bill_id}")).await.json();
    assert_eq!(bill["lineItems"].as_array().unwrap().len(), 1);
    assert_eq!(bill["lineItems"][0]["amount"], 1500);
}

#[tokio::test]
async fn add_line_item_to_missing_bill_is_not_found() {
    let server = test_server();
    let response = server
        .post("/bills/bill-nobody-1/items")
        .json(&json!({ "description": "subscription", "amount": 1500 }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_line_item_rejects_negative_amount() {
    let server = test_server();
    let bill_id = create_bill(&server, "customer-1", "USD").await;

    let response = server
        .post(&format!("/bills/{bill_id}/items"))
        .json(&json!({ "description": "refund", "amount": -100 }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn close_bill_finalizes_with_total() {
    let server = test_server();
    let bill_id = create_bill(&server, "customer-1", "USD").await;

    for amount in [1000, 1500] {
        server
            .post(&format!("/bills/{bill_id}/items"))
            .json(&json!({ "description": "charge", "amount": amount }))
            .await
            .assert_status_ok();
    }

    server
        .post(&format!("/bills/{bill_id}/close"))
        .await
        .assert_status_ok();

    let bill = wait_until_closed(&server, &bill_id).await;
    assert_eq!(bill["totalAmount"], 2500);
    assert_eq!(bill["lineItems"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn closing_a_closed_bill_conflicts() {
    let server = test_server();
    let bill_id = create_bill(&server, "customer-1", "GEL").await;

    server
        .post(&format!("/bills/{bill_id}/close"))
        .await
        .assert_status_ok();
    wait_until_closed(&server, &bill_id).await;

    let response = server.post(&format!("/bills/{bill_id}/close")).await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_all_rejects_oversized_limit() {
    let server = test_server();
    let response = server.get("/bills?limit=1001").await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn customer_listing_is_scoped_and_filtered() {
    let server = test_server();
    let first = create_bill(&server, "customer-1", "USD").await;
    create_bill(&server, "customer-1", "GEL").await;
    create_bill(&server, "customer-2", "USD").await;

    server
        .post(&format!("/bills/{first}/close"))
        .await
        .assert_status_ok();
    wait_until_closed(&server, &first).await;

    let all: Value = server.get("/customers/customer-1/bills").await.json();
    assert_eq!(all["total"], 2);

    let closed: Value = server
        .get("/customers/customer-1/bills?status=CLOSED")
        .await
        .json();
    assert_eq!(closed["total"], 1);
    assert_eq!(closed["bills"][0]["id"], first);

    let unknown_status = server
        .get("/customers/customer-1/bills?status=VOID")
        .await;
    unknown_status.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}
