//! Revoke Authenticator Device Use Case
//!
//! Password re-proof, then tombstone the target device.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::application::config::IdentityConfig;
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{ids::AuthenticatorDeviceId, user_password::RawPassword};
use crate::error::{IdentityError, IdentityResult};

pub struct RevokeDeviceInput {
    /// Current password, re-proven before the factor is removed
    pub password: String,
    pub device_id: AuthenticatorDeviceId,
}

pub struct RevokeDeviceUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
    config: Arc<IdentityConfig>,
}

impl<R, S, C> RevokeDeviceUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, session: Arc<S>, clock: Arc<C>, config: Arc<IdentityConfig>) -> Self {
        Self {
            user_repo,
            session,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: RevokeDeviceInput) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let password_matches = RawPassword::new(input.password)
            .map(|raw| user.verify_password(&raw, self.config.pepper()))
            .unwrap_or(false);
        if !password_matches {
            return Err(IdentityError::PasswordNotCorrect);
        }

        user.revoke_authenticator_device(&input.device_id, self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, device_id = %input.device_id, "Authenticator device revoked");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::CurrentActor;
    use crate::domain::entity::user::User;
    use crate::domain::fido::RegisteredCredential;
    use crate::domain::value_object::{
        email::Email,
        person_name::PersonName,
        user_password::UserPassword,
    };
    use crate::infra::memory::{FixedClock, InMemoryUserRepository, StaticSession};
    use chrono::{DateTime, Utc};

    const PASSWORD: &str = "SomePassword123!";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn user_with_device() -> User {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        let mut user = User::register(
            Email::new("ada@example.com").unwrap(),
            PersonName::new("Ada", "Lovelace").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            t0(),
        );
        user.enroll_authenticator_device(
            RegisteredCredential {
                credential_id: b"cred-1".to_vec(),
                public_key: b"public-key".to_vec(),
                aaguid: uuid::Uuid::new_v4(),
                signature_counter: 0,
                credential_type: "public-key".to_string(),
            },
            "YubiKey",
            t0(),
        );
        user
    }

    async fn fixture(
        user: &User,
    ) -> (
        Arc<InMemoryUserRepository>,
        RevokeDeviceUseCase<InMemoryUserRepository, StaticSession, FixedClock>,
    ) {
        let repo = Arc::new(InMemoryUserRepository::new());
        repo.add(user).await.unwrap();
        repo.save_changes().await;
        let session = Arc::new(StaticSession::with_actor(CurrentActor::Authenticated {
            user_id: *user.user_id(),
            email: user.email().clone(),
            profile: user.profile().clone(),
        }));
        let uc = RevokeDeviceUseCase::new(
            Arc::clone(&repo),
            session,
            Arc::new(FixedClock::at(t0())),
            Arc::new(IdentityConfig::default()),
        );
        (repo, uc)
    }

    #[tokio::test]
    async fn test_revoke_device() {
        let user = user_with_device();
        let device_id = *user.active_devices().next().unwrap().id();
        let (repo, uc) = fixture(&user).await;

        uc.execute(RevokeDeviceInput {
            password: PASSWORD.to_string(),
            device_id,
        })
        .await
        .unwrap();

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert_eq!(stored.active_devices().count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_blocks_revocation() {
        let user = user_with_device();
        let device_id = *user.active_devices().next().unwrap().id();
        let (_, uc) = fixture(&user).await;

        let result = uc
            .execute(RevokeDeviceInput {
                password: "WrongPassword1!".to_string(),
                device_id,
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::PasswordNotCorrect);
    }

    #[tokio::test]
    async fn test_unknown_device() {
        let user = user_with_device();
        let (_, uc) = fixture(&user).await;

        let result = uc
            .execute(RevokeDeviceInput {
                password: PASSWORD.to_string(),
                device_id: AuthenticatorDeviceId::new(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::DeviceNotFound);
    }
}
