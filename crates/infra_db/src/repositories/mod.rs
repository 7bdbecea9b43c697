//! Repository implementations

pub mod bill;
