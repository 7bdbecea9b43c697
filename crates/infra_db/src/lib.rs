//! Database Infrastructure Layer
//!
//! PostgreSQL adapters for the billing system:
//!
//! - [`BillRepository`]: the `BillStore` port over the `bills` and
//!   `line_items` tables
//! - [`PgJournal`]: the `durable_flow::Journal` port over `flow_events`
//! - [`DatabaseConfig`]: connection pool configuration
//!
//! Migrations live in `migrations/` and are embedded via [`MIGRATOR`].

pub mod error;
pub mod journal;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use journal::PgJournal;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use repositories::bill::BillRepository;

/// Embedded schema migrations, run at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
