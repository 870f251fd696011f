//! Typed identifiers for the identity domain

use kernel::id::Id;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;

pub struct SecurityTokenMarker;
pub type SecurityTokenId = Id<SecurityTokenMarker>;

pub struct AuthenticatorAppMarker;
pub type AuthenticatorAppId = Id<AuthenticatorAppMarker>;

pub struct AuthenticatorDeviceMarker;
pub type AuthenticatorDeviceId = Id<AuthenticatorDeviceMarker>;

pub struct NotificationMarker;
pub type NotificationId = Id<NotificationMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_v4() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_token_id_roundtrip() {
        let token_id = SecurityTokenId::new();
        let parsed = SecurityTokenId::parse(&token_id.to_string()).unwrap();
        assert_eq!(parsed, token_id);
    }
}
