//! Password History Entry
//!
//! A retired password hash kept for reuse checks. Comparison is always
//! "does the candidate verify against this hash" since equal passwords
//! never produce equal Argon2 strings.

use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHistoryEntry {
    hash: UserPassword,
    when_used: DateTime<Utc>,
}

impl PasswordHistoryEntry {
    pub(crate) fn new(hash: UserPassword, when_used: DateTime<Utc>) -> Self {
        Self { hash, when_used }
    }

    pub fn when_used(&self) -> DateTime<Utc> {
        self.when_used
    }

    /// Whether the candidate password verifies against this retired hash
    pub fn matches(&self, candidate: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.hash.verify(candidate, pepper)
    }
}
