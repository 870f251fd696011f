//! Security Stamp Value Object
//!
//! A per-user stable random secret. Its only productive use in the core
//! is as the TOTP seed for email one-time codes; delivery latency is why
//! the verification window here is wider (three steps either side) than
//! the authenticator-app tolerance.

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

const OTP_DIGITS: usize = 6;
const OTP_STEP: u64 = 30;
/// Email codes travel through a mailbox; allow three steps of drift
const OTP_SKEW: u8 = 3;

/// Per-user random secret seeding the email OTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityStamp {
    secret_base32: String,
}

impl SecurityStamp {
    /// Generate a fresh stamp for a new user
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from storage)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid security stamp: {:?}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded stamp for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn to_totp(&self) -> AppResult<TOTP> {
        let bytes = Secret::Encoded(self.secret_base32.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid security stamp: {:?}", e)))?;

        Ok(TOTP::new_unchecked(
            Algorithm::SHA1,
            OTP_DIGITS,
            OTP_SKEW,
            OTP_STEP,
            bytes,
        ))
    }

    /// Generate the email one-time code for the given instant
    pub fn email_code(&self, at: DateTime<Utc>) -> AppResult<String> {
        let totp = self.to_totp()?;
        Ok(totp.generate(at.timestamp().max(0) as u64))
    }

    /// Verify an email one-time code at the given instant
    pub fn verify_email_code(&self, code: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let totp = self.to_totp()?;
        Ok(totp.check(code, at.timestamp().max(0) as u64))
    }
}
