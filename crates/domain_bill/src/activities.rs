//! Finalization steps
//!
//! The two operations the workflow runs under retry when a bill closes. Both
//! are idempotent: the total computation is pure, and the final write sets
//! the same column values on every re-invocation.

use std::sync::Arc;

use crate::bill::{FinalBill, LineItem};
use crate::ports::{BillStore, StoreError};

/// Finalization steps bound to a bill store.
pub struct BillActivities {
    store: Arc<dyn BillStore>,
}

impl BillActivities {
    pub fn new(store: Arc<dyn BillStore>) -> Self {
        Self { store }
    }

    /// Sums the accumulated line items. Pure; safe to re-execute.
    pub fn compute_total(&self, items: &[LineItem]) -> i64 {
        let total = items.iter().map(|item| item.amount).sum();
        tracing::debug!(line_items = items.len(), total, "computed bill total");
        total
    }

    /// Writes the final status and total to the bill row.
    ///
    /// A plain set-columns write keyed by bill id, so re-invoking with the
    /// same [`FinalBill`] produces the same end state. Fails distinctly when
    /// the row is missing.
    pub async fn save_final_bill(&self, bill: &FinalBill) -> Result<(), StoreError> {
        self.store
            .finalize_bill(&bill.id, bill.status, bill.total_amount)
            .await?;
        tracing::info!(bill_id = %bill.id, total_amount = bill.total_amount, "bill finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::LineItem;
    use crate::ports::{BillStore, StoreError};
    use crate::{Bill, BillStatus, BillSummary};
    use async_trait::async_trait;
    use core_kernel::BillId;

    struct NoStore;

    #[async_trait]
    impl BillStore for NoStore {
        async fn create_bill(&self, _: &Bill) -> Result<(), StoreError> {
            unreachable!()
        }
        async fn bill(&self, id: &BillId) -> Result<Bill, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
        async fn bill_status(&self, id: &BillId) -> Result<BillStatus, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
        async fn add_line_item(&self, _: &BillId, _: &LineItem) -> Result<(), StoreError> {
            unreachable!()
        }
        async fn finalize_bill(
            &self,
            id: &BillId,
            _: BillStatus,
            _: i64,
        ) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
        async fn list_by_customer(
            &self,
            _: &str,
            _: Option<BillStatus>,
            _: i64,
            _: i64,
        ) -> Result<Vec<BillSummary>, StoreError> {
            unreachable!()
        }
        async fn list_all(
            &self,
            _: Option<BillStatus>,
            _: i64,
            _: i64,
        ) -> Result<Vec<BillSummary>, StoreError> {
            unreachable!()
        }
    }

    #[test]
    fn compute_total_sums_amounts() {
        let activities = BillActivities::new(Arc::new(NoStore));
        let items = vec![LineItem::new("a", 1000), LineItem::new("b", 1500)];
        assert_eq!(activities.compute_total(&items), 2500);
        assert_eq!(activities.compute_total(&[]), 0);
    }

    #[tokio::test]
    async fn save_final_bill_propagates_missing_row() {
        let activities = BillActivities::new(Arc::new(NoStore));
        let final_bill = FinalBill {
            id: BillId::from("bill-x-1"),
            total_amount: 0,
            status: BillStatus::Closed,
        };
        assert!(matches!(
            activities.save_final_bill(&final_bill).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
