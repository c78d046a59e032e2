//! Repository implementations
//!
//! Each repository owns the SQL for one table family and returns row
//! types. Queries are checked at runtime (`sqlx::query_as` with
//! `FromRow`); enum columns map to PostgreSQL enum types via `sqlx::Type`.

pub mod lodging;
pub mod invoice;
pub mod checkin_code;
pub mod transport;
pub mod settings;

pub use lodging::LodgingRepository;
pub use invoice::InvoiceRepository;
pub use checkin_code::CheckinCodeRepository;
pub use transport::TransportRepository;
pub use settings::SettingsRepository;
