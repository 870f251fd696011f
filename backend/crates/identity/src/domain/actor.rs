//! Current Actor and Session Context
//!
//! A sum type for "who is acting", replacing nullable user/claims lookups.
//! `Unauthenticated` is the half-logged-in state between a successful
//! password check and MFA completion; `System` is for trusted internal
//! flows such as first-run setup.

use crate::domain::value_object::{
    email::Email, ids::UserId, mfa_provider::MfaProviders, person_name::PersonName,
};

/// The identity attached to the current operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentActor {
    /// Fully authenticated user
    Authenticated {
        user_id: UserId,
        email: Email,
        profile: PersonName,
    },
    /// Password accepted, MFA still pending
    Unauthenticated {
        user_id: UserId,
        pending_providers: MfaProviders,
    },
    /// Trusted internal caller, not tied to a user
    System,
}

impl CurrentActor {
    /// The acting user's id, if the actor is tied to a user
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            CurrentActor::Authenticated { user_id, .. }
            | CurrentActor::Unauthenticated { user_id, .. } => Some(user_id),
            CurrentActor::System => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, CurrentActor::Authenticated { .. })
    }
}

/// Access to the actor of the in-flight operation
///
/// Implemented by the hosting layer (request context, job runner). `None`
/// means no session at all, which the use cases surface as a not-found.
pub trait CurrentSession: Send + Sync {
    fn current_actor(&self) -> Option<CurrentActor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_actor_has_no_user() {
        assert_eq!(CurrentActor::System.user_id(), None);
        assert!(!CurrentActor::System.is_authenticated());
    }

    #[test]
    fn test_unauthenticated_carries_user_id() {
        let user_id = UserId::new();
        let actor = CurrentActor::Unauthenticated {
            user_id: user_id.clone(),
            pending_providers: MfaProviders::NONE,
        };
        assert_eq!(actor.user_id(), Some(&user_id));
        assert!(!actor.is_authenticated());
    }
}
