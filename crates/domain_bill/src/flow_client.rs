//! Engine client for bill workflows
//!
//! Bridges the domain's [`WorkflowPort`] onto the `durable_flow` registry:
//! it constructs [`BillWorkflow`] instances from their initial payload and
//! translates engine errors into the port's error type. Also provides the
//! restart-recovery sweep that resumes journaled instances.

use async_trait::async_trait;
use core_kernel::BillId;
use serde_json::Value;
use std::sync::Arc;

use durable_flow::{FlowError, FlowRegistry, RetryPolicy};

use crate::activities::BillActivities;
use crate::bill::Bill;
use crate::ports::{BillStore, EngineError, WorkflowPort};
use crate::workflow::BillWorkflow;

/// Client starting, signaling and resuming bill workflow instances.
#[derive(Clone)]
pub struct BillFlowClient {
    registry: FlowRegistry,
    activities: Arc<BillActivities>,
    retry: RetryPolicy,
}

impl BillFlowClient {
    pub fn new(registry: FlowRegistry, store: Arc<dyn BillStore>) -> Self {
        Self {
            registry,
            activities: Arc::new(BillActivities::new(store)),
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the finalization retry policy for all instances this client
    /// starts (tests shorten the timings).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_workflow(&self, bill: Bill) -> BillWorkflow {
        BillWorkflow::new(bill, self.activities.clone()).with_retry_policy(self.retry.clone())
    }

    /// Resumes every journaled instance without a completion record.
    ///
    /// Called once at startup; journaled signals replay through the same
    /// queues, so an instance that had already received its close signal
    /// finalizes again (idempotently). Returns the number of instances
    /// resumed.
    pub async fn resume_open(&self) -> Result<usize, EngineError> {
        let keys = self
            .registry
            .open_keys()
            .await
            .map_err(engine_error)?;
        let mut resumed = 0;
        for key in keys {
            let Some(initial) = self
                .registry
                .started_payload(&key)
                .await
                .map_err(engine_error)?
            else {
                tracing::warn!(instance = %key, "open instance has no start record, skipping");
                continue;
            };
            let bill: Bill = serde_json::from_value(initial)
                .map_err(|err| EngineError::Backend(err.to_string()))?;
            self.registry
                .resume(&key, self.build_workflow(bill))
                .await
                .map_err(engine_error)?;
            tracing::info!(instance = %key, "resumed bill workflow");
            resumed += 1;
        }
        Ok(resumed)
    }
}

#[async_trait]
impl WorkflowPort for BillFlowClient {
    async fn start_instance(&self, key: &BillId, initial: Value) -> Result<(), EngineError> {
        let bill: Bill = serde_json::from_value(initial.clone())
            .map_err(|err| EngineError::Backend(err.to_string()))?;
        self.registry
            .start(key.as_str(), &initial, self.build_workflow(bill))
            .await
            .map_err(engine_error)
    }

    async fn signal_instance(
        &self,
        key: &BillId,
        kind: &str,
        payload: Value,
    ) -> Result<(), EngineError> {
        self.registry
            .signal(key.as_str(), kind, payload)
            .await
            .map_err(engine_error)
    }
}

fn engine_error(err: FlowError) -> EngineError {
    match err {
        FlowError::DuplicateInstance(key) => EngineError::DuplicateInstance(key),
        FlowError::UnknownInstance(key) => EngineError::UnknownInstance(key),
        FlowError::SignalRejected { key, kind } => EngineError::Rejected { key, kind },
        other => EngineError::Backend(other.to_string()),
    }
}
