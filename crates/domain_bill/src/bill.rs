//! Bill aggregate and its value types

use chrono::{DateTime, Utc};
use core_kernel::{BillId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::Currency;

/// Lifecycle status of a bill. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Open => "OPEN",
            BillStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(BillStatus::Open),
            "CLOSED" => Ok(BillStatus::Closed),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// One charge appended to an open bill. Immutable once created; ordered by
/// `recorded_at` ascending within a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    /// Amount in the smallest currency unit; strictly positive.
    pub amount: i64,
    pub recorded_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, amount: i64) -> Self {
        Self {
            description: description.into(),
            amount,
            recorded_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if self.amount <= 0 {
            return Err(ValidationError::InvalidAmount(self.amount));
        }
        Ok(())
    }
}

/// The accumulating billing record for one customer transaction period.
///
/// While `status` is Open, `total_amount` is not authoritative and may be
/// stale; once Closed it equals the sum of all line items delivered to the
/// workflow before the close command and never changes again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub customer_id: String,
    pub currency: Currency,
    pub status: BillStatus,
    pub line_items: Vec<LineItem>,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a fresh Open bill with no items.
    pub fn open(customer_id: impl Into<String>, currency: Currency) -> Self {
        let customer_id = customer_id.into();
        Self {
            id: BillId::generate(&customer_id),
            customer_id,
            currency,
            status: BillStatus::Open,
            line_items: Vec::new(),
            total_amount: 0,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerId);
        }
        // Currency and status are enum-typed; unrecognized values are caught
        // when parsing at the storage or API boundary.
        Ok(())
    }

    /// Sum of all line item amounts; 0 for an empty bill.
    pub fn calculate_total(&self) -> i64 {
        self.line_items.iter().map(|item| item.amount).sum()
    }

    /// Line items may only be added while the bill is Open.
    pub fn can_add_line_item(&self) -> bool {
        self.status == BillStatus::Open
    }
}

/// Result payload of the finalize step; write-once per bill id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalBill {
    pub id: BillId,
    pub total_amount: i64,
    pub status: BillStatus,
}

/// Projection of a bill without line items, used for listing.
///
/// The total is omitted: it is not authoritative while the bill is Open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub id: BillId,
    pub customer_id: String,
    pub currency: Currency,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}
