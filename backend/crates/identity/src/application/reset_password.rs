//! Reset Password Use Case
//!
//! Completes a reset: the token stands in for the current password, the
//! reuse window is enforced, and the token is consumed in the same unit
//! of work as the credential change.

use std::sync::Arc;

use crate::application::{commit, decode_token_id};
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{IdentityError, IdentityResult};

pub struct ResetPasswordInput {
    /// Base64-wrapped token id from the reset link
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    user_repo: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    config: Arc<IdentityConfig>,
}

impl<R, D, C> ResetPasswordUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, dispatcher: Arc<D>, clock: Arc<C>, config: Arc<IdentityConfig>) -> Self {
        Self {
            user_repo,
            dispatcher,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> IdentityResult<()> {
        let token_id = decode_token_id(&input.token)?;
        let now = self.clock.now();

        let mut user = self
            .user_repo
            .find_by_security_token(&token_id, now)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let raw = RawPassword::new(input.new_password)?;
        if user.password_in_history(&raw, self.config.password_history_limit, self.config.pepper())
        {
            return Err(IdentityError::PasswordInHistory);
        }

        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;
        let event = user.change_password(password_hash, now);
        user.consume_security_token(&token_id, now)?;

        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user.user_id(), "Password reset completed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::encode_token_id;
    use crate::domain::entity::security_token::SecurityTokenPurpose;
    use crate::domain::entity::user::User;
    use crate::domain::event::DomainEvent;
    use crate::domain::value_object::{
        email::Email,
        person_name::PersonName,
    };
    use crate::infra::memory::{FixedClock, InMemoryUserRepository, RecordingDispatcher};
    use chrono::{DateTime, Duration, Utc};

    const OLD_PASSWORD: &str = "OldPassword123!";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    async fn fixture() -> (
        Arc<InMemoryUserRepository>,
        Arc<RecordingDispatcher>,
        ResetPasswordUseCase<InMemoryUserRepository, RecordingDispatcher, FixedClock>,
        User,
        String,
    ) {
        let raw = RawPassword::new(OLD_PASSWORD.to_string()).unwrap();
        let mut user = User::register(
            Email::new("ada@example.com").unwrap(),
            PersonName::new("Ada", "Lovelace").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            t0(),
        );
        let (token_id, _) = user.issue_security_token(
            SecurityTokenPurpose::PasswordReset,
            Duration::hours(2),
            t0(),
        );

        let repo = Arc::new(InMemoryUserRepository::new());
        repo.add(&user).await.unwrap();
        repo.save_changes().await;

        let dispatcher = Arc::new(RecordingDispatcher::new());
        let uc = ResetPasswordUseCase::new(
            Arc::clone(&repo),
            Arc::clone(&dispatcher),
            Arc::new(FixedClock::at(t0())),
            Arc::new(IdentityConfig::default()),
        );
        let token = encode_token_id(&token_id);
        (repo, dispatcher, uc, user, token)
    }

    #[tokio::test]
    async fn test_reset_changes_password_and_consumes_token() {
        let (repo, dispatcher, uc, user, token) = fixture().await;

        uc.execute(ResetPasswordInput {
            token: token.clone(),
            new_password: "NewPassword456!".to_string(),
        })
        .await
        .unwrap();

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        let new = RawPassword::new("NewPassword456!".to_string()).unwrap();
        assert!(stored.verify_password(&new, None));
        assert!(matches!(
            dispatcher.events().as_slice(),
            [DomainEvent::PasswordChanged { .. }]
        ));

        // The token is spent
        let again = uc
            .execute(ResetPasswordInput {
                token,
                new_password: "ThirdPassword789!".to_string(),
            })
            .await;
        assert_eq!(again.unwrap_err(), IdentityError::UserNotFound);
    }

    #[tokio::test]
    async fn test_recently_used_password_rejected() {
        let (repo, _, uc, user, token) = fixture().await;

        // Retire the old password first so it is in history
        let mut stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        let raw = RawPassword::new("InterimPass456!".to_string()).unwrap();
        stored.change_password(UserPassword::from_raw(&raw, None).unwrap(), t0());
        repo.update(&stored).await.unwrap();
        repo.save_changes().await;

        let result = uc
            .execute(ResetPasswordInput {
                token,
                new_password: OLD_PASSWORD.to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::PasswordInHistory);
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (_, _, uc, _, _) = fixture().await;
        let result = uc
            .execute(ResetPasswordInput {
                token: encode_token_id(
                    &crate::domain::value_object::ids::SecurityTokenId::new(),
                ),
                new_password: "NewPassword456!".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::UserNotFound);
    }
}
