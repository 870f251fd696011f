//! TOTP Secret Value Object
//!
//! Shared key for an enrolled authenticator app, Google Authenticator
//! compatible (SHA-1, 6 digits, 30 second step). Verification takes an
//! explicit timestamp so all time-based decisions flow through the
//! injected clock, and uses a tight tolerance of one step either side.

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
/// Allow one step before/after for clock drift
const TOTP_SKEW: u8 = 1;

/// Shared TOTP key for an authenticator app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random shared key
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (caller-supplied or stored)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::bad_request(format!("Invalid authenticator key: {:?}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded key (shown once during enrollment)
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn to_totp(&self) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(self.secret_base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {:?}", e)))?;

        Ok(TOTP::new_unchecked(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            bytes,
        ))
    }

    /// Verify a code at the given instant
    pub fn verify(&self, code: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let totp = self.to_totp()?;
        Ok(totp.check(code, at.timestamp().max(0) as u64))
    }

    /// Generate the code for the given instant
    pub fn generate_code(&self, at: DateTime<Utc>) -> AppResult<String> {
        let totp = self.to_totp()?;
        Ok(totp.generate(at.timestamp().max(0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_generate_is_base32() {
        let secret = TotpSecret::generate();
        assert!(!secret.as_base32().is_empty());
        assert!(TotpSecret::from_base32(secret.as_base32()).is_ok());
    }

    #[test]
    fn test_verify_current_code() {
        let secret = TotpSecret::generate();
        let code = secret.generate_code(t0()).unwrap();
        assert!(secret.verify(&code, t0()).unwrap());
        assert!(!secret.verify("000000", t0()).unwrap());
    }

    #[test]
    fn test_tight_window() {
        let secret = TotpSecret::generate();
        let code = secret.generate_code(t0()).unwrap();

        // One step of drift is accepted
        assert!(secret
            .verify(&code, t0() + chrono::Duration::seconds(30))
            .unwrap());
        // Three steps is outside the window
        assert!(!secret
            .verify(&code, t0() + chrono::Duration::seconds(120))
            .unwrap());
    }

    #[test]
    fn test_from_base32_rejects_garbage() {
        assert!(TotpSecret::from_base32("not base32 at all!!!").is_err());
    }
}
