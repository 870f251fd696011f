//! Authenticator App Entity
//!
//! An enrolled TOTP app. At most one may be active per user; revocation
//! is a tombstone so the enrollment history stays auditable.

use crate::domain::value_object::ids::AuthenticatorAppId;
use crate::domain::value_object::totp_secret::TotpSecret;
use chrono::{DateTime, Utc};

/// An enrolled (possibly revoked) authenticator app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorApp {
    id: AuthenticatorAppId,
    shared_key: TotpSecret,
    when_added: DateTime<Utc>,
    when_revoked: Option<DateTime<Utc>>,
}

impl AuthenticatorApp {
    pub(crate) fn enroll(shared_key: TotpSecret, now: DateTime<Utc>) -> Self {
        Self {
            id: AuthenticatorAppId::new(),
            shared_key,
            when_added: now,
            when_revoked: None,
        }
    }

    pub fn id(&self) -> &AuthenticatorAppId {
        &self.id
    }

    pub fn shared_key(&self) -> &TotpSecret {
        &self.shared_key
    }

    pub fn is_active(&self) -> bool {
        self.when_revoked.is_none()
    }

    pub(crate) fn revoke(&mut self, now: DateTime<Utc>) {
        self.when_revoked = Some(now);
    }
}
