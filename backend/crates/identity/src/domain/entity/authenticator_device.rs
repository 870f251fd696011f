//! Authenticator Device Entity
//!
//! A registered FIDO2 credential. The signature counter only ever moves
//! forward; the aggregate enforces this when recording a verified
//! assertion.

use crate::domain::fido::RegisteredCredential;
use crate::domain::value_object::ids::AuthenticatorDeviceId;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered (possibly revoked) FIDO2 device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorDevice {
    id: AuthenticatorDeviceId,
    name: String,
    credential_id: Vec<u8>,
    public_key: Vec<u8>,
    aaguid: Uuid,
    signature_counter: u32,
    credential_type: String,
    when_added: DateTime<Utc>,
    when_revoked: Option<DateTime<Utc>>,
}

impl AuthenticatorDevice {
    pub(crate) fn register(
        credential: RegisteredCredential,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuthenticatorDeviceId::new(),
            name: name.into(),
            credential_id: credential.credential_id,
            public_key: credential.public_key,
            aaguid: credential.aaguid,
            signature_counter: credential.signature_counter,
            credential_type: credential.credential_type,
            when_added: now,
            when_revoked: None,
        }
    }

    pub fn id(&self) -> &AuthenticatorDeviceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn aaguid(&self) -> &Uuid {
        &self.aaguid
    }

    pub fn signature_counter(&self) -> u32 {
        self.signature_counter
    }

    pub fn credential_type(&self) -> &str {
        &self.credential_type
    }

    pub fn is_active(&self) -> bool {
        self.when_revoked.is_none()
    }

    pub(crate) fn record_counter(&mut self, new_counter: u32) {
        self.signature_counter = new_counter;
    }

    pub(crate) fn revoke(&mut self, now: DateTime<Utc>) {
        self.when_revoked = Some(now);
    }
}
