//! Core Kernel - Foundational types for the billing system
//!
//! This crate provides the building blocks shared by the domain, infra and
//! interface layers:
//! - The `BillId` identifier type
//! - The field-level validation error taxonomy

pub mod error;
pub mod identifiers;

pub use error::ValidationError;
pub use identifiers::BillId;
