//! Authentication State
//!
//! The next step a caller must take after a successful primary-credential
//! check. The terminal "fully authenticated" state has no variant here:
//! it is signaled by an MFA validation use case returning a user id.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Pending authentication state after the password check
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthenticationState {
    /// No authentication flow in progress
    #[default]
    Unknown,
    /// An email one-time code was dispatched and must be validated
    AwaitingMfaEmailCode,
    /// An authenticator-app code must be validated
    AwaitingMfaAppCode,
    /// A FIDO2 device assertion must be validated
    AwaitingMfaDeviceCode,
}

impl AuthenticationState {
    /// Whether a next MFA step is pending
    pub fn is_pending(&self) -> bool {
        !matches!(self, AuthenticationState::Unknown)
    }
}
