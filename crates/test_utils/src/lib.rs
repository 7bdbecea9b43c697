//! Test Utilities Crate
//!
//! Shared test infrastructure for the billing test suite:
//!
//! - `memory`: an in-memory `BillStore` implementation
//! - `builders`: builder helpers for test bills and line items

pub mod builders;
pub mod memory;

pub use builders::*;
pub use memory::MemoryBillStore;
