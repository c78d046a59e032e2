//! Realtime error types

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Could not reach or talk to Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The event could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RealtimeError> for PortError {
    fn from(error: RealtimeError) -> Self {
        let transient = matches!(
            &error,
            RealtimeError::Redis(e) if e.is_io_error() || e.is_connection_dropped() || e.is_timeout()
        );
        if transient {
            return PortError::Connection {
                message: error.to_string(),
                source: Some(Box::new(error)),
            };
        }

        match error {
            RealtimeError::Serialization(e) => PortError::Transformation {
                message: e.to_string(),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
