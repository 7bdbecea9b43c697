//! Bill DTOs
//!
//! Wire representations use camelCase field names; currency and status
//! travel as their upper-case codes and are parsed (and rejected) at this
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::ValidationError;
use domain_bill::{Bill, BillStatus, BillSummary, LineItem, ListBillsResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillBody {
    pub customer_id: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillResponse {
    pub bill_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineItemBody {
    pub description: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub description: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            description: item.description,
            amount: item.amount,
            timestamp: item.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub id: String,
    pub customer_id: String,
    pub currency: String,
    pub status: String,
    pub line_items: Vec<LineItemResponse>,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            id: bill.id.to_string(),
            customer_id: bill.customer_id,
            currency: bill.currency.code().to_string(),
            status: bill.status.to_string(),
            line_items: bill.line_items.into_iter().map(Into::into).collect(),
            total_amount: bill.total_amount,
            created_at: bill.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSummaryResponse {
    pub id: String,
    pub customer_id: String,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<BillSummary> for BillSummaryResponse {
    fn from(summary: BillSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            customer_id: summary.customer_id,
            currency: summary.currency.code().to_string(),
            status: summary.status.to_string(),
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillsApiResponse {
    pub bills: Vec<BillSummaryResponse>,
    pub total: usize,
}

impl From<ListBillsResponse> for ListBillsApiResponse {
    fn from(page: ListBillsResponse) -> Self {
        Self {
            total: page.total,
            bills: page.bills.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paging and status filter for the listing endpoints. Missing or zero
/// values defer to the service-level defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    /// Parses the status filter; empty strings mean no filter.
    pub fn status_filter(&self) -> Result<Option<BillStatus>, ValidationError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some(status) => BillStatus::from_str(status).map(Some),
        }
    }
}
