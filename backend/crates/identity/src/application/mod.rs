//! Application Layer
//!
//! One use case per command. Every handler follows the same single-pass
//! shape: load the aggregate, compute the domain outcome in memory,
//! stage the aggregate, commit the unit of work, and only then dispatch
//! the events the aggregate produced. A failed commit overrides any
//! domain outcome with `SavingChanges`.

pub mod account_status;
pub mod authenticate;
pub mod change_password;
pub mod config;
pub mod enroll_app;
pub mod enroll_device;
pub mod notifications;
pub mod register_user;
pub mod request_password_reset;
pub mod reset_password;
pub mod revoke_app;
pub mod revoke_device;
pub mod setup;
pub mod validate_app_code;
pub mod validate_device_assertion;
pub mod validate_email_code;
pub mod verify_account;

use crate::domain::actor::CurrentSession;
use crate::domain::repository::{SaveResult, UserRepository};
use crate::domain::value_object::ids::{SecurityTokenId, UserId};
use crate::error::{IdentityError, IdentityResult};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Commit staged changes, translating the save outcome
pub(crate) async fn commit<R: UserRepository>(repo: &R) -> IdentityResult<()> {
    match repo.save_changes().await {
        SaveResult::Committed => Ok(()),
        SaveResult::UniquenessViolation => Err(IdentityError::UserAlreadyExists),
        SaveResult::Failure => Err(IdentityError::SavingChanges),
    }
}

/// Resolve the acting user's id; an absent or system session is reported
/// as a not-found before any aggregate access
pub(crate) fn session_user_id<S: CurrentSession>(session: &S) -> IdentityResult<UserId> {
    session
        .current_actor()
        .and_then(|actor| actor.user_id().copied())
        .ok_or(IdentityError::UserNotFound)
}

/// Wrap a security token id for inclusion in a link
pub fn encode_token_id(token_id: &SecurityTokenId) -> String {
    URL_SAFE_NO_PAD.encode(token_id.to_string())
}

/// Unwrap a link-carried token id. Any malformed input maps to
/// `UserNotFound` so callers cannot probe the token format.
pub(crate) fn decode_token_id(encoded: &str) -> IdentityResult<SecurityTokenId> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| IdentityError::UserNotFound)?;
    let text = String::from_utf8(bytes).map_err(|_| IdentityError::UserNotFound)?;
    SecurityTokenId::parse(&text).map_err(|_| IdentityError::UserNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_codec_roundtrip() {
        let token_id = SecurityTokenId::new();
        let encoded = encode_token_id(&token_id);
        assert_eq!(decode_token_id(&encoded).unwrap(), token_id);
    }

    #[test]
    fn test_malformed_token_is_not_found() {
        assert_eq!(
            decode_token_id("%%%not-base64%%%").unwrap_err(),
            IdentityError::UserNotFound
        );
        assert_eq!(
            decode_token_id(&URL_SAFE_NO_PAD.encode("not-a-uuid")).unwrap_err(),
            IdentityError::UserNotFound
        );
    }
}
