//! Durable Flow - In-Process Durable Execution Engine
//!
//! This crate hosts long-lived workflow instances keyed by a unique string.
//! Each instance runs as a single cooperative task that consumes signals from
//! one FIFO queue per signal kind. Every signal is appended to a journal
//! before delivery, so an instance can be resumed after a process restart by
//! replaying its journal through the same queues.
//!
//! # Guarantees
//!
//! - At most one live instance per key (`start` rejects duplicates)
//! - Per-kind FIFO delivery; cross-kind interleaving is not specified
//! - Signals are journaled before they are enqueued
//! - Side-effecting steps run under an exponential-backoff retry policy
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = FlowRegistry::new(Arc::new(MemoryJournal::new()));
//! registry.start("bill-1", &initial, workflow).await?;
//! registry.signal("bill-1", "ADD_LINE_ITEM", payload).await?;
//! ```

pub mod error;
pub mod journal;
pub mod registry;
pub mod retry;

pub use error::FlowError;
pub use journal::{Journal, JournalRecord, MemoryJournal, COMPLETED_KIND, STARTED_KIND};
pub use registry::{FlowRegistry, SignalReceiver, Workflow, WorkflowContext};
pub use retry::{run_with_retry, RetryPolicy};
