//! Bill domain errors
//!
//! One variant per caller-visible error kind, so every layer above can
//! distinguish them structurally: validation failures, unknown bills,
//! closed-bill conflicts, and dependency failures (store or execution
//! engine). Retry budget exhaustion inside finalization surfaces on the
//! workflow side as `durable_flow::FlowError::StepFailed`.

use core_kernel::{BillId, ValidationError};
use thiserror::Error;

use crate::ports::{EngineError, StoreError};

/// Errors surfaced by the bill command service.
#[derive(Debug, Error)]
pub enum BillError {
    /// Caller input is malformed; nothing was persisted or signaled.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The bill id is unknown to the persistence layer.
    #[error("bill not found: {0}")]
    NotFound(BillId),

    /// The bill is already closed; the command was rejected.
    #[error("bill is already closed: {0}")]
    AlreadyClosed(BillId),

    /// A persistence or orchestration-engine call failed. Never retried by
    /// the command service; retry lives inside the workflow's finalization.
    #[error("{context}: {source}")]
    Dependency {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BillError {
    pub(crate) fn from_store(context: &'static str, id: &BillId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => BillError::NotFound(id.clone()),
            other => BillError::Dependency {
                context,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn from_engine(context: &'static str, err: EngineError) -> Self {
        BillError::Dependency {
            context,
            source: Box::new(err),
        }
    }
}
