//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the lending ports backed by PostgreSQL via
//! Diesel, with async support through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Implementations only translate between Diesel rows
//!   and domain types. Lending rules live in the domain services.
//! - **Internal models**: Row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Row locks**: `DieselLendingStore` locks the book row for the life of a
//!   transaction, which serialises writers per book.
//!
//! # Example
//!
//! ```ignore
//! use lending::outbound::persistence::{DbPool, DieselLendingStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lending")).await?;
//! let store = DieselLendingStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_lending_records;
mod diesel_lending_store;
mod lending_rows;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_lending_records::DieselLendingRecords;
pub use diesel_lending_store::DieselLendingStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
