//! Realtime Infrastructure
//!
//! Publishes driver-facing events over Redis pub/sub. Delivery is fire and
//! forget: subscribers that are offline when an event is published miss it,
//! and callers treat publish failures as non-fatal.

pub mod error;
pub mod redis_notifier;

pub use error::RealtimeError;
pub use redis_notifier::RedisDriverNotifier;
