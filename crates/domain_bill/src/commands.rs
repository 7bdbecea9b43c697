//! Inbound command and query types
//!
//! Every command validates itself before the service performs any side
//! effect. Listing requests normalize their paging in place; note the
//! deliberate asymmetry between the customer-scoped and the unscoped listing:
//! the scoped one silently clamps oversized limits, the unscoped one rejects
//! them.

use core_kernel::ValidationError;
use serde::{Deserialize, Serialize};

use crate::bill::{BillStatus, BillSummary};
use crate::currency::Currency;

/// Default page size for the customer-scoped listing.
pub const DEFAULT_CUSTOMER_PAGE: i64 = 10;
/// Hard cap for the customer-scoped listing; larger requests are clamped.
pub const MAX_CUSTOMER_PAGE: i64 = 100;
/// Default page size for the unscoped listing.
pub const DEFAULT_ALL_PAGE: i64 = 50;
/// Hard limit for the unscoped listing; larger requests are rejected.
pub const MAX_ALL_PAGE: i64 = 1000;

/// Command to open a new bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBillRequest {
    pub customer_id: String,
    pub currency: Currency,
}

impl CreateBillRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerId);
        }
        Ok(())
    }
}

/// Command to append a line item to an open bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLineItemRequest {
    pub description: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
}

impl AddLineItemRequest {
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

/// Query for the bills of one customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBillsRequest {
    pub customer_id: String,
    pub status: Option<BillStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl ListBillsRequest {
    /// Validates the query and normalizes paging in place: non-positive
    /// limits become the default, oversized limits are clamped, negative
    /// offsets reset to zero.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerId);
        }
        if self.limit <= 0 {
            self.limit = DEFAULT_CUSTOMER_PAGE;
        }
        if self.limit > MAX_CUSTOMER_PAGE {
            self.limit = MAX_CUSTOMER_PAGE;
        }
        if self.offset < 0 {
            self.offset = 0;
        }
        Ok(())
    }
}

/// Query across all customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAllBillsRequest {
    pub status: Option<BillStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl ListAllBillsRequest {
    /// Validates the query and normalizes paging in place. Unlike the
    /// customer-scoped listing, a limit above [`MAX_ALL_PAGE`] is a hard
    /// validation failure, not a clamp.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.limit <= 0 {
            self.limit = DEFAULT_ALL_PAGE;
        }
        if self.offset < 0 {
            self.offset = 0;
        }
        if self.limit > MAX_ALL_PAGE {
            return Err(ValidationError::LimitTooLarge {
                requested: self.limit,
                max: MAX_ALL_PAGE,
            });
        }
        Ok(())
    }
}

/// One page of bill summaries. `total` is the number of rows in this page,
/// not a global count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBillsResponse {
    pub bills: Vec<BillSummary>,
    pub total: usize,
}
