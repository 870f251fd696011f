//! Security Token Entity
//!
//! A single-use, time-boxed proof of an out-of-band step (mailbox
//! ownership, password reset). The random id IS the secret; it leaves
//! the core only inside the token-generated events.

use crate::domain::value_object::ids::SecurityTokenId;
use chrono::{DateTime, Duration, Utc};

/// What a security token proves when presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityTokenPurpose {
    /// Confirms control of the account email
    AccountConfirmation,
    /// Authorizes a password reset without the current password
    PasswordReset,
}

/// Single-use token attached to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken {
    id: SecurityTokenId,
    purpose: SecurityTokenPurpose,
    when_created: DateTime<Utc>,
    when_expires: DateTime<Utc>,
    when_consumed: Option<DateTime<Utc>>,
}

impl SecurityToken {
    pub(crate) fn issue(
        purpose: SecurityTokenPurpose,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SecurityTokenId::new(),
            purpose,
            when_created: now,
            when_expires: now + lifetime,
            when_consumed: None,
        }
    }

    pub fn id(&self) -> &SecurityTokenId {
        &self.id
    }

    pub fn purpose(&self) -> SecurityTokenPurpose {
        self.purpose
    }

    pub fn when_expires(&self) -> DateTime<Utc> {
        self.when_expires
    }

    /// Usable means not consumed and not expired at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.when_consumed.is_none() && now < self.when_expires
    }

    pub(crate) fn consume(&mut self, now: DateTime<Utc>) {
        self.when_consumed = Some(now);
    }
}
