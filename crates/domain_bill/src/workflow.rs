//! Durable bill workflow
//!
//! One instance per bill id, keyed by the id itself so the engine enforces
//! at-most-one live instance per bill. The instance is the single authority
//! on whether a bill is closed at any instant; the persisted status column is
//! an eventually-consistent projection written by the finalization steps.
//!
//! State machine: Accumulating -> Finalizing -> Done. While Accumulating the
//! workflow waits without timeout on two signal sources; the only way out is
//! the close signal.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use durable_flow::{
    run_with_retry, FlowError, RetryPolicy, SignalReceiver, Workflow, WorkflowContext,
};

use crate::activities::BillActivities;
use crate::bill::{Bill, BillStatus, FinalBill, LineItem};

/// Signal kind carrying one line item.
pub const ADD_LINE_ITEM_SIGNAL: &str = "ADD_LINE_ITEM";

/// Signal kind requesting the close transition. Marker only, no payload.
pub const CLOSE_BILL_SIGNAL: &str = "CLOSE_BILL";

/// The per-bill orchestrator.
pub struct BillWorkflow {
    bill: Bill,
    activities: Arc<BillActivities>,
    retry: RetryPolicy,
}

impl BillWorkflow {
    pub fn new(bill: Bill, activities: Arc<BillActivities>) -> Self {
        Self {
            bill,
            activities,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the finalization retry policy (tests shorten the timings).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl Workflow for BillWorkflow {
    fn signal_kinds(&self) -> &'static [&'static str] {
        &[ADD_LINE_ITEM_SIGNAL, CLOSE_BILL_SIGNAL]
    }

    async fn run(self: Box<Self>, mut ctx: WorkflowContext) -> Result<(), FlowError> {
        let bill_id = self.bill.id.clone();
        tracing::info!(bill_id = %bill_id, "starting bill workflow");

        let mut item_signals: SignalReceiver<LineItem> =
            ctx.signal_channel(ADD_LINE_ITEM_SIGNAL)?;
        let mut close_signals: SignalReceiver<Value> = ctx.signal_channel(CLOSE_BILL_SIGNAL)?;

        // Accumulating: merge the two sources with no fixed priority.
        // Delivery is FIFO per source; cross-source interleaving is not
        // deterministic.
        let mut line_items: Vec<LineItem> = Vec::new();
        loop {
            tokio::select! {
                Some(item) = item_signals.recv() => {
                    tracing::info!(
                        bill_id = %bill_id,
                        description = %item.description,
                        amount = item.amount,
                        "received line item",
                    );
                    line_items.push(item);
                }
                Some(_) = close_signals.recv() => {
                    // Fold in every item signaled strictly before the close,
                    // in per-queue order, before leaving Accumulating.
                    while let Some(item) = item_signals.try_recv() {
                        line_items.push(item);
                    }
                    tracing::info!(
                        bill_id = %bill_id,
                        total_line_items = line_items.len(),
                        "received close signal",
                    );
                    break;
                }
                else => return Err(FlowError::ChannelsClosed(bill_id.to_string())),
            }
        }

        // Finalizing: the item source is dropped, so late item signals bounce
        // at the registry instead of reaching this instance.
        drop(item_signals);

        let total = run_with_retry("compute_total", &self.retry, || async {
            Ok::<i64, FlowError>(self.activities.compute_total(&line_items))
        })
        .await?;

        let final_bill = FinalBill {
            id: bill_id.clone(),
            total_amount: total,
            status: BillStatus::Closed,
        };
        run_with_retry("save_final_bill", &self.retry, || {
            let final_bill = final_bill.clone();
            let activities = self.activities.clone();
            async move { activities.save_final_bill(&final_bill).await }
        })
        .await?;

        tracing::info!(
            bill_id = %bill_id,
            total_amount = total,
            line_items = line_items.len(),
            "bill workflow completed",
        );
        Ok(())
    }
}
