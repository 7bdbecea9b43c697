//! Bill Domain - Accumulate-Then-Finalize Billing
//!
//! This crate implements the lifecycle of a bill: an accumulating ledger of
//! charges for a customer that starts Open, accepts incremental line items,
//! and is explicitly closed to produce an immutable final total.
//!
//! # Components
//!
//! - Domain model: [`Bill`], [`LineItem`], [`Currency`], [`BillStatus`]
//! - [`BillService`]: the stateless command facade (validate, persist, signal)
//! - [`BillWorkflow`]: the durable per-bill orchestrator that merges the
//!   add-item and close signal streams and runs finalization with retry
//! - [`BillActivities`]: the two idempotent finalization steps
//!
//! The persisted bill row is the record of truth for reads; the workflow
//! instance is the record of truth for in-flight accumulation and the single
//! authority over the close transition. The two meet only in the finalize
//! write.

pub mod activities;
pub mod bill;
pub mod commands;
pub mod currency;
pub mod error;
pub mod flow_client;
pub mod ports;
pub mod service;
pub mod workflow;

pub use activities::BillActivities;
pub use bill::{Bill, BillStatus, BillSummary, FinalBill, LineItem};
pub use commands::{
    AddLineItemRequest, CreateBillRequest, ListAllBillsRequest, ListBillsRequest, ListBillsResponse,
};
pub use currency::Currency;
pub use error::BillError;
pub use flow_client::BillFlowClient;
pub use ports::{BillStore, EngineError, StoreError, WorkflowPort};
pub use service::BillService;
pub use workflow::{BillWorkflow, ADD_LINE_ITEM_SIGNAL, CLOSE_BILL_SIGNAL};
