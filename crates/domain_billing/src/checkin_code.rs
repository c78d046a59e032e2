//! Check-in codes
//!
//! Every booking gets one short code the guest presents at the property.
//! Codes are drawn from an alphabet without look-alike characters and stored
//! next to their SHA-256 hash. A draw that collides with an existing code is
//! retried with a fresh draw, up to [`MAX_CODE_ATTEMPTS`] times.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use core_kernel::{BookingId, CheckinCodeId};

use crate::error::SettlementError;
use crate::ports::CheckinCodePort;

/// Characters a code is drawn from; no `0/O` or `1/I`
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LENGTH: usize = 8;

/// Draws allowed before generation gives up
pub const MAX_CODE_ATTEMPTS: u32 = 10;

/// Check-in code status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckinCodeStatus {
    Active,
    /// Consumed at check-in
    Used,
    Revoked,
}

impl CheckinCodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinCodeStatus::Active => "ACTIVE",
            CheckinCodeStatus::Used => "USED",
            CheckinCodeStatus::Revoked => "REVOKED",
        }
    }
}

/// A persisted check-in code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinCode {
    pub id: CheckinCodeId,
    pub booking_id: BookingId,
    pub code: String,
    pub code_hash: String,
    pub status: CheckinCodeStatus,
    pub generated_at: DateTime<Utc>,
}

/// A code about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckinCode {
    pub booking_id: BookingId,
    pub code: String,
    pub code_hash: String,
    pub status: CheckinCodeStatus,
    pub generated_at: DateTime<Utc>,
}

impl NewCheckinCode {
    pub fn draw(booking_id: BookingId) -> Self {
        let code = generate_code(&mut rand::thread_rng());
        Self {
            booking_id,
            code_hash: hash_code(&code),
            code,
            status: CheckinCodeStatus::Active,
            generated_at: Utc::now(),
        }
    }
}

/// Draws a code uniformly from [`CODE_ALPHABET`]
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Lowercase hex SHA-256 of a code
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Allocates check-in codes with retry on collision
///
/// Runs outside any invoice transaction so collision retries never extend
/// a financial lock.
pub struct CheckinCodeGenerator {
    codes: Arc<dyn CheckinCodePort>,
    max_attempts: u32,
}

impl CheckinCodeGenerator {
    pub fn new(codes: Arc<dyn CheckinCodePort>) -> Self {
        Self {
            codes,
            max_attempts: MAX_CODE_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns the booking's code, generating one if it has none
    ///
    /// An existing code is never replaced.
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn ensure_for_booking(&self, booking_id: BookingId) -> Result<CheckinCodeId, SettlementError> {
        if let Some(existing) = self.codes.find_by_booking(booking_id).await? {
            return Ok(existing.id);
        }
        self.generate(booking_id).await
    }

    /// Generates and persists a new code
    ///
    /// A uniqueness conflict triggers a fresh draw, unless the conflict was a
    /// concurrent request creating this booking's code, in which case that
    /// code is reused. Any other failure aborts immediately.
    pub async fn generate(&self, booking_id: BookingId) -> Result<CheckinCodeId, SettlementError> {
        for attempt in 1..=self.max_attempts {
            match self.codes.insert(NewCheckinCode::draw(booking_id)).await {
                Ok(created) => {
                    debug!(attempt, code_id = %created.id, "Check-in code allocated");
                    return Ok(created.id);
                }
                Err(err) if err.is_conflict() => {
                    if let Some(existing) = self.codes.find_by_booking(booking_id).await? {
                        return Ok(existing.id);
                    }
                    warn!(attempt, "Check-in code collision, drawing again");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(SettlementError::CodeGenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockCheckinCodePort;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_code_uses_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
            assert!(!code.contains('0') && !code.contains('O'));
            assert!(!code.contains('1') && !code.contains('I'));
        }
    }

    #[test]
    fn test_hash_is_lowercase_sha256_hex() {
        assert_eq!(
            hash_code("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_code("ABCD2345").len(), 64);
    }

    #[tokio::test]
    async fn test_existing_code_is_reused() {
        let port = Arc::new(MockCheckinCodePort::new());
        let generator = CheckinCodeGenerator::new(port.clone());

        let first = generator.ensure_for_booking(BookingId::new(1)).await.unwrap();
        let second = generator.ensure_for_booking(BookingId::new(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(port.count_for_booking(BookingId::new(1)).await, 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let port = Arc::new(MockCheckinCodePort::new());
        port.force_conflicts(MAX_CODE_ATTEMPTS - 1);
        let generator = CheckinCodeGenerator::new(port.clone());

        assert!(generator.generate(BookingId::new(2)).await.is_ok());
        assert_eq!(port.insert_attempts(), MAX_CODE_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_exhaustion_is_fatal() {
        let port = Arc::new(MockCheckinCodePort::new());
        port.force_conflicts(MAX_CODE_ATTEMPTS);
        let generator = CheckinCodeGenerator::new(port.clone());

        let err = generator.generate(BookingId::new(3)).await.unwrap_err();
        assert!(matches!(err, SettlementError::CodeGenerationExhausted { attempts: 10 }));
        assert_eq!(port.count_for_booking(BookingId::new(3)).await, 0);
    }

    #[tokio::test]
    async fn test_other_failures_abort() {
        let port = Arc::new(MockCheckinCodePort::new());
        port.fail_inserts(true);
        let generator = CheckinCodeGenerator::new(port.clone());

        let err = generator.generate(BookingId::new(4)).await.unwrap_err();
        assert!(matches!(err, SettlementError::Port(_)));
        assert_eq!(port.insert_attempts(), 1);
    }
}
