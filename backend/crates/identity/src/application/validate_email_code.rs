//! Validate Email Code Use Case
//!
//! Completes an email-code MFA step for the mid-MFA session. Success
//! records a full successful authentication (clearing the failure
//! counter); a wrong code is journaled without touching the counter.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::UserId;
use crate::error::{IdentityError, IdentityResult};

pub struct ValidateEmailCodeInput {
    pub code: String,
}

#[derive(Debug)]
pub struct ValidateEmailCodeOutput {
    /// Fully authenticated user
    pub user_id: UserId,
}

pub struct ValidateEmailCodeUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> ValidateEmailCodeUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, session: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            session,
            clock,
        }
    }

    pub async fn execute(
        &self,
        input: ValidateEmailCodeInput,
    ) -> IdentityResult<ValidateEmailCodeOutput> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let now = self.clock.now();
        let valid = user.verify_email_mfa_code(&input.code, now)?;

        let outcome = if valid {
            user.record_successful_authentication(now);
            Ok(())
        } else {
            user.record_email_mfa_failure(now);
            Err(IdentityError::MfaCodeNotValid)
        };

        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;
        outcome?;

        tracing::info!(user_id = %user_id, "Email MFA completed");
        Ok(ValidateEmailCodeOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::CurrentActor;
    use crate::domain::entity::login_attempt::AttemptKind;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::{
        email::Email,
        mfa_provider::MfaProviders,
        person_name::PersonName,
        user_password::{RawPassword, UserPassword},
    };
    use crate::infra::memory::{FixedClock, InMemoryUserRepository, StaticSession};
    use chrono::{DateTime, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn user() -> User {
        let raw = RawPassword::new("SomePassword123!".to_string()).unwrap();
        User::register(
            Email::new("ada@example.com").unwrap(),
            PersonName::new("Ada", "Lovelace").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            t0(),
        )
    }

    fn mid_mfa_session(user: &User) -> StaticSession {
        StaticSession::with_actor(CurrentActor::Unauthenticated {
            user_id: *user.user_id(),
            pending_providers: MfaProviders::NONE,
        })
    }

    async fn seed(repo: &InMemoryUserRepository, user: &User) {
        repo.add(user).await.unwrap();
        repo.save_changes().await;
    }

    #[tokio::test]
    async fn test_correct_code_authenticates_and_resets_counter() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut user = user();
        user.record_failed_attempt(false, t0());
        let code = user.email_mfa_code(t0()).unwrap();
        seed(&repo, &user).await;

        let use_case = ValidateEmailCodeUseCase::new(
            Arc::clone(&repo),
            Arc::new(mid_mfa_session(&user)),
            Arc::new(FixedClock::at(t0())),
        );

        let output = use_case
            .execute(ValidateEmailCodeInput { code })
            .await
            .unwrap();
        assert_eq!(output.user_id, *user.user_id());

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert_eq!(stored.attempts_since_last_authentication(), 0);
        assert_eq!(
            stored.login_attempts().last().unwrap().kind(),
            AttemptKind::Succeeded
        );
    }

    #[tokio::test]
    async fn test_wrong_code_is_journaled_without_counter_reset() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let mut user = user();
        user.record_failed_attempt(false, t0());
        seed(&repo, &user).await;

        let use_case = ValidateEmailCodeUseCase::new(
            Arc::clone(&repo),
            Arc::new(mid_mfa_session(&user)),
            Arc::new(FixedClock::at(t0())),
        );

        let result = use_case
            .execute(ValidateEmailCodeInput {
                code: "000000".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::MfaCodeNotValid);

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert_eq!(stored.attempts_since_last_authentication(), 1);
        assert_eq!(
            stored.login_attempts().last().unwrap().kind(),
            AttemptKind::EmailMfaFailed
        );
    }

    #[tokio::test]
    async fn test_no_session_is_not_found() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let use_case = ValidateEmailCodeUseCase::new(
            Arc::clone(&repo),
            Arc::new(StaticSession::anonymous()),
            Arc::new(FixedClock::at(t0())),
        );

        let result = use_case
            .execute(ValidateEmailCodeInput {
                code: "123456".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::UserNotFound);
    }

    #[tokio::test]
    async fn test_drifted_code_within_window() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = user();
        let code = user.email_mfa_code(t0()).unwrap();
        seed(&repo, &user).await;

        // Ninety seconds later: still inside the wide email window
        let use_case = ValidateEmailCodeUseCase::new(
            Arc::clone(&repo),
            Arc::new(mid_mfa_session(&user)),
            Arc::new(FixedClock::at(t0() + chrono::Duration::seconds(90))),
        );

        assert!(use_case.execute(ValidateEmailCodeInput { code }).await.is_ok());
    }
}
