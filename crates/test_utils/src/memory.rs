//! In-memory bill store
//!
//! Implements the `BillStore` port over a hash map for service, workflow and
//! API tests. Mirrors the persistence contract: per-bill atomic updates,
//! newest-first listings, distinct not-found on the finalize write.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use core_kernel::BillId;
use domain_bill::{Bill, BillStatus, BillStore, BillSummary, LineItem, StoreError};

/// In-memory `BillStore` for tests.
#[derive(Debug, Default)]
pub struct MemoryBillStore {
    bills: RwLock<HashMap<String, Bill>>,
}

impl MemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bill rows currently stored.
    pub async fn bill_count(&self) -> usize {
        self.bills.read().await.len()
    }

    /// Number of line item rows stored for one bill.
    pub async fn line_item_count(&self, id: &BillId) -> usize {
        self.bills
            .read()
            .await
            .get(id.as_str())
            .map(|bill| bill.line_items.len())
            .unwrap_or(0)
    }

    fn summarize(bill: &Bill) -> BillSummary {
        BillSummary {
            id: bill.id.clone(),
            customer_id: bill.customer_id.clone(),
            currency: bill.currency,
            status: bill.status,
            created_at: bill.created_at,
        }
    }

    async fn list(
        &self,
        customer_id: Option<&str>,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Vec<BillSummary> {
        let bills = self.bills.read().await;
        let mut matches: Vec<&Bill> = bills
            .values()
            .filter(|bill| customer_id.map_or(true, |c| bill.customer_id == c))
            .filter(|bill| status.map_or(true, |s| bill.status == s))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(Self::summarize)
            .collect()
    }
}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn create_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        let mut bills = self.bills.write().await;
        if bills.contains_key(bill.id.as_str()) {
            return Err(StoreError::Backend(format!(
                "duplicate bill id: {}",
                bill.id
            )));
        }
        bills.insert(bill.id.as_str().to_string(), bill.clone());
        Ok(())
    }

    async fn bill(&self, id: &BillId) -> Result<Bill, StoreError> {
        self.bills
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn bill_status(&self, id: &BillId) -> Result<BillStatus, StoreError> {
        self.bills
            .read()
            .await
            .get(id.as_str())
            .map(|bill| bill.status)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn add_line_item(&self, id: &BillId, item: &LineItem) -> Result<(), StoreError> {
        let mut bills = self.bills.write().await;
        let bill = bills
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        bill.line_items.push(item.clone());
        Ok(())
    }

    async fn finalize_bill(
        &self,
        id: &BillId,
        status: BillStatus,
        total_amount: i64,
    ) -> Result<(), StoreError> {
        let mut bills = self.bills.write().await;
        let bill = bills
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        bill.status = status;
        bill.total_amount = total_amount;
        Ok(())
    }

    async fn list_by_customer(
        &self,
        customer_id: &str,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError> {
        Ok(self.list(Some(customer_id), status, limit, offset).await)
    }

    async fn list_all(
        &self,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError> {
        Ok(self.list(None, status, limit, offset).await)
    }
}
