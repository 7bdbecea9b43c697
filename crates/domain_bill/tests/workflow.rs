//! End-to-end bill lifecycle through the durable workflow.

use std::sync::Arc;
use std::time::Duration;

use core_kernel::BillId;
use domain_bill::{
    AddLineItemRequest, BillActivities, BillFlowClient, BillService, BillStatus, BillStore,
    CreateBillRequest, Currency, FinalBill,
};
use durable_flow::{FlowRegistry, Journal, MemoryJournal};
use test_utils::MemoryBillStore;

struct Harness {
    service: BillService,
    store: Arc<MemoryBillStore>,
    journal: Arc<MemoryJournal>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryBillStore::new());
    let journal = Arc::new(MemoryJournal::new());
    let registry = FlowRegistry::new(journal.clone());
    let flows = Arc::new(BillFlowClient::new(registry, store.clone()));
    Harness {
        service: BillService::new(store.clone(), flows),
        store,
        journal,
    }
}

async fn create(service: &BillService, customer: &str) -> BillId {
    service
        .create_bill(CreateBillRequest {
            customer_id: customer.to_string(),
            currency: Currency::Usd,
        })
        .await
        .unwrap()
}

async fn add(service: &BillService, bill_id: &BillId, description: &str, amount: i64) {
    service
        .add_line_item(
            bill_id,
            AddLineItemRequest {
                description: description.to_string(),
                amount,
            },
        )
        .await
        .unwrap();
}

/// Polls until the persisted bill reaches Closed; finalization runs on the
/// workflow task after the close signal is acknowledged.
async fn wait_for_closed(store: &MemoryBillStore, bill_id: &BillId) {
    for _ in 0..400 {
        if let Ok(bill) = store.bill(bill_id).await {
            if bill.status == BillStatus::Closed {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("bill {bill_id} never closed");
}

#[tokio::test]
async fn full_lifecycle_produces_the_final_total() {
    let h = harness();
    let bill_id = create(&h.service, "c1").await;
    add(&h.service, &bill_id, "subscription", 1000).await;
    add(&h.service, &bill_id, "usage", 1500).await;
    h.service.close_bill(&bill_id).await.unwrap();

    wait_for_closed(&h.store, &bill_id).await;

    let bill = h.service.get_bill(&bill_id).await.unwrap();
    assert_eq!(bill.status, BillStatus::Closed);
    assert_eq!(bill.total_amount, 2500);
    assert_eq!(bill.line_items.len(), 2);
    // Insertion order is preserved.
    assert_eq!(bill.line_items[0].description, "subscription");
    assert_eq!(bill.line_items[1].description, "usage");
}

#[tokio::test]
async fn closing_with_no_items_totals_zero() {
    let h = harness();
    let bill_id = create(&h.service, "c1").await;
    h.service.close_bill(&bill_id).await.unwrap();

    wait_for_closed(&h.store, &bill_id).await;

    let bill = h.service.get_bill(&bill_id).await.unwrap();
    assert_eq!(bill.status, BillStatus::Closed);
    assert_eq!(bill.total_amount, 0);
    assert!(bill.line_items.is_empty());
}

#[tokio::test]
async fn items_after_close_never_change_the_total() {
    let h = harness();
    let bill_id = create(&h.service, "c1").await;
    add(&h.service, &bill_id, "only charge", 700).await;
    h.service.close_bill(&bill_id).await.unwrap();
    wait_for_closed(&h.store, &bill_id).await;

    let result = h
        .service
        .add_line_item(
            &bill_id,
            AddLineItemRequest {
                description: "too late".to_string(),
                amount: 9999,
            },
        )
        .await;
    assert!(result.is_err());

    let bill = h.service.get_bill(&bill_id).await.unwrap();
    assert_eq!(bill.total_amount, 700);
    assert_eq!(bill.line_items.len(), 1);
}

#[tokio::test]
async fn completed_instances_leave_a_completion_record() {
    let h = harness();
    let bill_id = create(&h.service, "c1").await;
    h.service.close_bill(&bill_id).await.unwrap();
    wait_for_closed(&h.store, &bill_id).await;

    for _ in 0..400 {
        if h.journal.open_keys().await.unwrap().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("completion record never journaled");
}

#[tokio::test]
async fn finalize_is_idempotent() {
    let store = Arc::new(MemoryBillStore::new());
    let bill = domain_bill::Bill::open("c1", Currency::Usd);
    let bill_id = bill.id.clone();
    store.create_bill(&bill).await.unwrap();

    let activities = BillActivities::new(store.clone());
    let final_bill = FinalBill {
        id: bill_id.clone(),
        total_amount: 2500,
        status: BillStatus::Closed,
    };

    activities.save_final_bill(&final_bill).await.unwrap();
    let first = store.bill(&bill_id).await.unwrap();

    activities.save_final_bill(&final_bill).await.unwrap();
    let second = store.bill(&bill_id).await.unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.total_amount, second.total_amount);
    assert_eq!(second.total_amount, 2500);
}

#[tokio::test]
async fn resume_after_restart_recovers_accumulated_items() {
    let store = Arc::new(MemoryBillStore::new());
    let journal: Arc<MemoryJournal> = Arc::new(MemoryJournal::new());

    // First process lifetime: create and accumulate, then "crash" by
    // abandoning the registry before the close.
    let bill_id = {
        let registry = FlowRegistry::new(journal.clone());
        let flows = Arc::new(BillFlowClient::new(registry, store.clone()));
        let service = BillService::new(store.clone(), flows);
        let bill_id = create(&service, "c1").await;
        add(&service, &bill_id, "before crash", 1000).await;
        add(&service, &bill_id, "also before crash", 500).await;
        bill_id
    };

    // Second process lifetime over the same journal and store.
    let registry = FlowRegistry::new(journal.clone());
    let flows = Arc::new(BillFlowClient::new(registry, store.clone()));
    let resumed = flows.resume_open().await.unwrap();
    assert_eq!(resumed, 1);

    let service = BillService::new(store.clone(), flows);
    add(&service, &bill_id, "after restart", 250).await;
    service.close_bill(&bill_id).await.unwrap();
    wait_for_closed(&store, &bill_id).await;

    let bill = service.get_bill(&bill_id).await.unwrap();
    assert_eq!(bill.total_amount, 1750);
    assert_eq!(bill.status, BillStatus::Closed);
}
