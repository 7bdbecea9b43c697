//! Domain ports
//!
//! The command service and the workflow talk to their collaborators through
//! these traits: `BillStore` for the persisted projection and `WorkflowPort`
//! for the durable-execution engine. Adapters live in `infra_db` (PostgreSQL)
//! and `test_utils` (in-memory).

use async_trait::async_trait;
use core_kernel::BillId;
use serde_json::Value;
use thiserror::Error;

use crate::bill::{Bill, BillStatus, BillSummary, LineItem};

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target bill row does not exist.
    #[error("bill not found: {0}")]
    NotFound(String),

    /// Any other backend failure, wrapped with context.
    #[error("store failure: {0}")]
    Backend(String),
}

/// Errors from the durable-execution collaborator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An instance is already live under this key.
    #[error("workflow instance already running: {0}")]
    DuplicateInstance(String),

    /// No live instance under this key.
    #[error("no running workflow instance: {0}")]
    UnknownInstance(String),

    /// The instance stopped consuming this signal kind; the signal was
    /// dropped after being journaled.
    #[error("signal {kind} rejected by instance {key}")]
    Rejected { key: String, kind: String },

    /// Any other engine failure.
    #[error("engine failure: {0}")]
    Backend(String),
}

/// Persistence port for bills and line items.
///
/// Implementations must support per-row atomic updates and concurrent
/// readers/writers across different bill ids; no multi-row transactions are
/// required.
#[async_trait]
pub trait BillStore: Send + Sync + 'static {
    /// Inserts a new Open bill row.
    async fn create_bill(&self, bill: &Bill) -> Result<(), StoreError>;

    /// Reads the full bill including line items, ordered by recording time.
    async fn bill(&self, id: &BillId) -> Result<Bill, StoreError>;

    /// Reads only the status column.
    async fn bill_status(&self, id: &BillId) -> Result<BillStatus, StoreError>;

    /// Appends one line item row.
    async fn add_line_item(&self, id: &BillId, item: &LineItem) -> Result<(), StoreError>;

    /// Sets status and total on the bill row. Idempotent for equal inputs;
    /// fails with [`StoreError::NotFound`] if the row does not exist.
    async fn finalize_bill(
        &self,
        id: &BillId,
        status: BillStatus,
        total_amount: i64,
    ) -> Result<(), StoreError>;

    /// Lists one customer's bills, newest first.
    async fn list_by_customer(
        &self,
        customer_id: &str,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError>;

    /// Lists bills across all customers, newest first.
    async fn list_all(
        &self,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError>;
}

/// Port to the durable-execution engine.
///
/// Mirrors the engine's own surface: start an instance under a unique key
/// (duplicate keys must be rejected, never a silent second instance) and
/// signal a running instance by kind.
#[async_trait]
pub trait WorkflowPort: Send + Sync + 'static {
    async fn start_instance(&self, key: &BillId, initial: Value) -> Result<(), EngineError>;

    async fn signal_instance(
        &self,
        key: &BillId,
        kind: &str,
        payload: Value,
    ) -> Result<(), EngineError>;
}
