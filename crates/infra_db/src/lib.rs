//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the settlement pipeline, built on SQLx.
//!
//! # Architecture
//!
//! Repositories own the SQL and speak in row types. Adapters wrap a
//! repository, implement a domain port and translate rows into domain
//! models and `DatabaseError` into `PortError`.
//!
//! Concurrency guarantees live in SQL:
//! - invoice creation locks the booking row, so concurrent settlements of
//!   one booking serialize
//! - unique constraints on `invoices.booking_id` and `checkin_codes.code`
//!   surface as conflicts the domain layer can recover from
//! - trip activation is a single conditional `UPDATE ... RETURNING`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::PostgresInvoiceAdapter;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/stay_settlement")).await?;
//! run_migrations(&pool).await?;
//! let invoices = PostgresInvoiceAdapter::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
