//! Revoke Authenticator App Use Case
//!
//! Removing an MFA factor weakens the account, so the current password
//! must be re-proven first. Revocation tombstones the enrollment; it is
//! never deleted.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::application::config::IdentityConfig;
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{IdentityError, IdentityResult};

pub struct RevokeAppInput {
    /// Current password, re-proven before the factor is removed
    pub password: String,
}

pub struct RevokeAppUseCase<R, S, C>
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

impl<R, S, C> RevokeAppUseCase<R, S, C>
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

    pub async fn execute(&self, input: RevokeAppInput) -> IdentityResult<()> {
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

        user.revoke_authenticator_app(self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "Authenticator app revoked");
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
    use crate::domain::value_object::{
        email::Email,
        person_name::PersonName,
        totp_secret::TotpSecret,
        user_password::UserPassword,
    };
    use crate::infra::memory::{FixedClock, InMemoryUserRepository, StaticSession};
    use chrono::{DateTime, Utc};

    const PASSWORD: &str = "SomePassword123!";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn user_with_app() -> User {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        let mut user = User::register(
            Email::new("ada@example.com").unwrap(),
            PersonName::new("Ada", "Lovelace").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            t0(),
        );
        user.enroll_authenticator_app(TotpSecret::generate(), t0())
            .unwrap();
        user
    }

    async fn fixture(
        user: &User,
    ) -> (
        Arc<InMemoryUserRepository>,
        RevokeAppUseCase<InMemoryUserRepository, StaticSession, FixedClock>,
    ) {
        let repo = Arc::new(InMemoryUserRepository::new());
        repo.add(user).await.unwrap();
        repo.save_changes().await;
        let session = Arc::new(StaticSession::with_actor(CurrentActor::Authenticated {
            user_id: *user.user_id(),
            email: user.email().clone(),
            profile: user.profile().clone(),
        }));
        let uc = RevokeAppUseCase::new(
            Arc::clone(&repo),
            session,
            Arc::new(FixedClock::at(t0())),
            Arc::new(IdentityConfig::default()),
        );
        (repo, uc)
    }

    #[tokio::test]
    async fn test_revoke_with_correct_password() {
        let user = user_with_app();
        let (repo, uc) = fixture(&user).await;

        uc.execute(RevokeAppInput {
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert!(stored.active_authenticator_app().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_blocks_revocation() {
        let user = user_with_app();
        let (repo, uc) = fixture(&user).await;

        let result = uc
            .execute(RevokeAppInput {
                password: "WrongPassword1!".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::PasswordNotCorrect);

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert!(stored.active_authenticator_app().is_some());
    }

    #[tokio::test]
    async fn test_no_active_app() {
        let mut user = user_with_app();
        user.revoke_authenticator_app(t0()).unwrap();
        let (_, uc) = fixture(&user).await;

        let result = uc
            .execute(RevokeAppInput {
                password: PASSWORD.to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::NoAuthenticatorAppEnrolled);
    }
}
