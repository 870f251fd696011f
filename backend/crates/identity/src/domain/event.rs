//! Domain Events
//!
//! Aggregate methods return the events they produce; handlers dispatch
//! them only after a successful save. Token events carry the raw token id
//! so the dispatcher can build a delivery link, since the id itself is
//! the secret and is never persisted anywhere else in clear form.

use crate::domain::value_object::{
    email::Email, ids::SecurityTokenId, person_name::PersonName,
};
use crate::error::IdentityResult;
use serde::Serialize;

/// Something that happened in the identity core that the outside world
/// (mailer, audit log) may need to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainEvent {
    /// A single-use account-confirmation token was issued
    AccountConfirmationTokenGenerated {
        email: Email,
        profile: PersonName,
        token_id: SecurityTokenId,
    },
    /// A single-use password-reset token was issued
    PasswordResetTokenGenerated {
        email: Email,
        profile: PersonName,
        token_id: SecurityTokenId,
    },
    /// An email MFA one-time code was produced for delivery
    EmailMfaCodeGenerated {
        email: Email,
        profile: PersonName,
        code: String,
    },
    /// The user's password was changed
    PasswordChanged { email: Email, profile: PersonName },
    /// The account was disabled (administratively or by lockout)
    UserDisabled { email: Email },
    /// The account was re-enabled
    UserEnabled { email: Email },
}

/// Outbound event boundary
///
/// Dispatch happens after the unit of work commits; a dispatch failure
/// never rolls back the domain outcome.
#[trait_variant::make(EventDispatcher: Send)]
pub trait LocalEventDispatcher {
    async fn dispatch(&self, events: &[DomainEvent]) -> IdentityResult<()>;
}
