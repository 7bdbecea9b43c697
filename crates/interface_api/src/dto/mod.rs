//! Data transfer objects

pub mod bill;
