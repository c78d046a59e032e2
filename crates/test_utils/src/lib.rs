//! Test Utilities Crate
//!
//! Shared test infrastructure for the settlement workspace.
//!
//! # Modules
//!
//! - `fixtures`: fixed dates and amounts used across suites
//! - `builders`: builders for properties, bookings and trips
//! - `database`: PostgreSQL testcontainer and row seeding
//! - `assertions`: assertions over settlement figures
//! - `generators`: proptest strategies

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
