//! FIDO2 Engine Capability
//!
//! The protocol work of WebAuthn (challenge generation, attestation and
//! assertion verification) lives behind this trait. The core only keeps
//! the verified credential material and enforces its own rules: credential
//! uniqueness across a user's devices and a strictly increasing signature
//! counter.

use crate::error::IdentityResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Challenge material for registering a new device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistrationOptions {
    pub challenge: Vec<u8>,
    /// Credential ids already registered, for the client to exclude
    pub excluded_credential_ids: Vec<Vec<u8>>,
}

/// Challenge material for a device assertion during login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAssertionOptions {
    pub challenge: Vec<u8>,
    /// Credential ids the user may answer with
    pub allowed_credential_ids: Vec<Vec<u8>>,
}

/// Client response to a registration challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationResponse {
    pub credential_id: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

/// Client response to an assertion challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResponse {
    pub credential_id: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

/// Credential material extracted from a verified attestation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCredential {
    pub credential_id: Vec<u8>,
    pub public_key: Vec<u8>,
    pub aaguid: Uuid,
    pub signature_counter: u32,
    pub credential_type: String,
}

/// WebAuthn protocol engine
#[trait_variant::make(Fido2Engine: Send)]
pub trait LocalFido2Engine {
    /// Build registration options for enrolling a new device
    async fn registration_options(
        &self,
        existing_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<DeviceRegistrationOptions>;

    /// Verify an attestation and extract the credential
    ///
    /// Must fail when the attested credential id matches one of
    /// `existing_credential_ids`.
    async fn verify_registration(
        &self,
        attestation: &AttestationResponse,
        existing_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<RegisteredCredential>;

    /// Build assertion options for a login challenge
    async fn assertion_options(
        &self,
        allowed_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<DeviceAssertionOptions>;

    /// Verify an assertion against the stored credential
    ///
    /// Returns the new signature counter, which must be greater than
    /// `signature_counter` for a healthy authenticator.
    async fn verify_assertion(
        &self,
        assertion: &AssertionResponse,
        public_key: &[u8],
        signature_counter: u32,
    ) -> IdentityResult<u32>;
}
