//! Strongly-typed identifiers for domain entities
//!
//! A newtype wrapper around the bill's string identifier prevents accidental
//! mixing with customer ids or other free-form strings. The identifier doubles
//! as the durable workflow instance key, so it must be globally unique and
//! stable across restarts.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a bill.
///
/// Constructed as `bill-{customer_id}-{unix_nanos}`: the high-resolution
/// timestamp suffix keeps concurrent creations for the same customer from
/// colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(String);

impl BillId {
    /// Generates a fresh identifier for the given customer.
    pub fn generate(customer_id: &str) -> Self {
        let nanos = Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_else(|| Utc::now().timestamp_micros());
        Self(format!("bill-{customer_id}-{nanos}"))
    }

    /// Wraps an existing identifier string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BillId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for BillId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<BillId> for String {
    fn from(id: BillId) -> String {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_embed_the_customer() {
        let id = BillId::generate("c1");
        assert!(id.as_str().starts_with("bill-c1-"));
    }

    #[test]
    fn generated_ids_are_unique_per_call() {
        let a = BillId::generate("c1");
        let b = BillId::generate("c1");
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_a_plain_string() {
        let id = BillId::from_string("bill-c1-42");
        assert_eq!(serde_json::to_value(&id).unwrap(), "bill-c1-42");
    }
}
