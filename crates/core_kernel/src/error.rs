//! Shared validation error taxonomy
//!
//! Field-level validation failures are surfaced immediately to the caller and
//! never retried. Keeping them in the kernel lets the domain, service and
//! interface layers agree on one structured type instead of matching on
//! strings.

use thiserror::Error;

/// Field-level validation errors for inbound commands and domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Currency code is not one of the supported values.
    #[error("invalid currency: {0}. Supported currencies: USD, GEL")]
    InvalidCurrency(String),

    /// Line item amount must be strictly positive (minor units).
    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),

    /// Line item description is blank after trimming.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// Customer identifier is blank after trimming.
    #[error("customer ID cannot be empty")]
    EmptyCustomerId,

    /// Status filter is not a recognized bill status.
    #[error("invalid bill status: {0}")]
    InvalidStatus(String),

    /// Unscoped listings reject oversized limits instead of clamping them.
    #[error("limit cannot exceed {max}, got {requested}")]
    LimitTooLarge { requested: i64, max: i64 },
}
