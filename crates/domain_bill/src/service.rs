//! Bill command service
//!
//! Stateless, reentrant facade over the store and the execution engine. Every
//! operation validates its input before any side effect and never retries;
//! retry lives inside the workflow's finalization steps.
//!
//! The read-then-signal ordering here is not atomic with the workflow's own
//! close transition: a line item can be persisted and signaled just as the
//! instance begins finalizing. The engine rejects the late signal and the
//! error is surfaced to the caller instead of corrupting instance state.

use std::sync::Arc;

use core_kernel::BillId;

use crate::bill::{Bill, BillStatus, LineItem};
use crate::commands::{
    AddLineItemRequest, CreateBillRequest, ListAllBillsRequest, ListBillsRequest,
    ListBillsResponse,
};
use crate::error::BillError;
use crate::ports::{BillStore, WorkflowPort};
use crate::workflow::{ADD_LINE_ITEM_SIGNAL, CLOSE_BILL_SIGNAL};

/// The command service for bills.
#[derive(Clone)]
pub struct BillService {
    store: Arc<dyn BillStore>,
    flows: Arc<dyn WorkflowPort>,
}

impl BillService {
    pub fn new(store: Arc<dyn BillStore>, flows: Arc<dyn WorkflowPort>) -> Self {
        Self { store, flows }
    }

    /// Opens a new bill and starts its workflow instance.
    ///
    /// If the row is persisted but the instance fails to start, the bill is
    /// left Open with no live workflow and the failure is reported to the
    /// caller; see `BillFlowClient::resume_open` for the recovery sweep.
    pub async fn create_bill(&self, request: CreateBillRequest) -> Result<BillId, BillError> {
        request.validate()?;

        let bill = Bill::open(request.customer_id.trim(), request.currency);
        let bill_id = bill.id.clone();

        self.store
            .create_bill(&bill)
            .await
            .map_err(|err| BillError::from_store("failed to create bill", &bill_id, err))?;

        let initial = serde_json::to_value(&bill).map_err(|err| BillError::Dependency {
            context: "failed to encode workflow payload",
            source: Box::new(err),
        })?;
        self.flows
            .start_instance(&bill_id, initial)
            .await
            .map_err(|err| BillError::from_engine("failed to start bill workflow", err))?;

        tracing::info!(bill_id = %bill_id, customer_id = %bill.customer_id, "bill created");
        Ok(bill_id)
    }

    /// Appends a line item to an open bill.
    ///
    /// The item row is persisted before the signal; a signal failure after
    /// persistence is surfaced as a dependency error rather than silently
    /// succeeding, since the in-flight total will not include the item.
    pub async fn add_line_item(
        &self,
        bill_id: &BillId,
        request: AddLineItemRequest,
    ) -> Result<(), BillError> {
        request.validate()?;

        let status = self
            .store
            .bill_status(bill_id)
            .await
            .map_err(|err| BillError::from_store("failed to read bill status", bill_id, err))?;
        if status == BillStatus::Closed {
            tracing::warn!(bill_id = %bill_id, "attempted to add line item to closed bill");
            return Err(BillError::AlreadyClosed(bill_id.clone()));
        }

        let item = LineItem::new(request.description, request.amount);
        self.store
            .add_line_item(bill_id, &item)
            .await
            .map_err(|err| BillError::from_store("failed to save line item", bill_id, err))?;

        let payload = serde_json::to_value(&item).map_err(|err| BillError::Dependency {
            context: "failed to encode line item signal",
            source: Box::new(err),
        })?;
        self.flows
            .signal_instance(bill_id, ADD_LINE_ITEM_SIGNAL, payload)
            .await
            .map_err(|err| BillError::from_engine("failed to signal line item", err))?;

        tracing::info!(bill_id = %bill_id, description = %item.description, amount = item.amount, "line item added");
        Ok(())
    }

    /// Requests the close transition for an open bill.
    pub async fn close_bill(&self, bill_id: &BillId) -> Result<(), BillError> {
        let bill = self
            .store
            .bill(bill_id)
            .await
            .map_err(|err| BillError::from_store("failed to read bill", bill_id, err))?;
        if bill.status == BillStatus::Closed {
            tracing::warn!(bill_id = %bill_id, "attempted to close already closed bill");
            return Err(BillError::AlreadyClosed(bill_id.clone()));
        }

        self.flows
            .signal_instance(bill_id, CLOSE_BILL_SIGNAL, serde_json::Value::Null)
            .await
            .map_err(|err| BillError::from_engine("failed to signal bill close", err))?;

        tracing::info!(bill_id = %bill_id, "bill close signal sent");
        Ok(())
    }

    /// Reads the persisted bill projection with its line items.
    pub async fn get_bill(&self, bill_id: &BillId) -> Result<Bill, BillError> {
        let bill = self
            .store
            .bill(bill_id)
            .await
            .map_err(|err| BillError::from_store("failed to read bill", bill_id, err))?;
        tracing::debug!(bill_id = %bill_id, status = %bill.status, "bill retrieved");
        Ok(bill)
    }

    /// Lists one customer's bills as summaries.
    pub async fn list_bills(
        &self,
        mut request: ListBillsRequest,
    ) -> Result<ListBillsResponse, BillError> {
        request.validate()?;

        let bills = self
            .store
            .list_by_customer(
                request.customer_id.trim(),
                request.status,
                request.limit,
                request.offset,
            )
            .await
            .map_err(|err| BillError::Dependency {
                context: "failed to list bills",
                source: Box::new(err),
            })?;

        tracing::debug!(customer_id = %request.customer_id, count = bills.len(), "bills listed");
        let total = bills.len();
        Ok(ListBillsResponse { bills, total })
    }

    /// Lists bills across all customers as summaries.
    pub async fn list_all_bills(
        &self,
        mut request: ListAllBillsRequest,
    ) -> Result<ListBillsResponse, BillError> {
        request.validate()?;

        let bills = self
            .store
            .list_all(request.status, request.limit, request.offset)
            .await
            .map_err(|err| BillError::Dependency {
                context: "failed to list bills",
                source: Box::new(err),
            })?;

        let total = bills.len();
        Ok(ListBillsResponse { bills, total })
    }
}
