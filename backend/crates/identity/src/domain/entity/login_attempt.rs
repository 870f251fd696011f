//! Login Attempt Journal
//!
//! Append-only record of authentication activity on a user, kept on the
//! aggregate so lockout decisions and audits read from one place.

use chrono::{DateTime, Utc};

/// What happened on a single authentication step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    /// Primary credential check failed
    Failed,
    /// Fully authenticated (password only, or MFA completed)
    Succeeded,
    /// Password accepted, email code dispatched
    EmailMfaRequested,
    /// Password accepted, app code requested
    AppMfaRequested,
    /// Password accepted, device assertion requested
    DeviceMfaRequested,
    /// An email one-time code failed to verify
    EmailMfaFailed,
}

/// One journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempt {
    kind: AttemptKind,
    at: DateTime<Utc>,
}

impl LoginAttempt {
    pub(crate) fn new(kind: AttemptKind, at: DateTime<Utc>) -> Self {
        Self { kind, at }
    }

    pub fn kind(&self) -> AttemptKind {
        self.kind
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}
