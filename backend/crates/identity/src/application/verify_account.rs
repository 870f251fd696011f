//! Verify Account Use Case
//!
//! Completes registration: the link-carried confirmation token proves
//! mailbox ownership, the account flips to verified, and the first real
//! credential is set in the same pass. The history check is skipped
//! here on purpose; this is a first-credential-set, not a change.

use std::sync::Arc;

use crate::application::{commit, decode_token_id};
use crate::domain::clock::Clock;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    ids::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{IdentityError, IdentityResult};

pub struct VerifyAccountInput {
    /// Base64-wrapped token id from the confirmation link
    pub token: String,
    pub password: String,
}

#[derive(Debug)]
pub struct VerifyAccountOutput {
    pub user_id: UserId,
}

pub struct VerifyAccountUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    user_repo: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    pepper: Option<Vec<u8>>,
}

impl<R, D, C> VerifyAccountUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    pub fn new(
        user_repo: Arc<R>,
        dispatcher: Arc<D>,
        clock: Arc<C>,
        pepper: Option<Vec<u8>>,
    ) -> Self {
        Self {
            user_repo,
            dispatcher,
            clock,
            pepper,
        }
    }

    pub async fn execute(&self, input: VerifyAccountInput) -> IdentityResult<VerifyAccountOutput> {
        let token_id = decode_token_id(&input.token)?;
        let now = self.clock.now();

        let mut user = self
            .user_repo
            .find_by_security_token(&token_id, now)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        user.verify_account(now)?;

        let raw = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw, self.pepper.as_deref())?;
        let event = user.change_password(password_hash, now);

        user.consume_security_token(&token_id, now)?;

        let user_id = *user.user_id();
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "Account verified");
        Ok(VerifyAccountOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::IdentityConfig;
    use crate::application::encode_token_id;
    use crate::application::register_user::{RegisterUserInput, RegisterUserUseCase};
    use crate::domain::event::DomainEvent;
    use crate::infra::memory::{FixedClock, InMemoryUserRepository, RecordingDispatcher};
    use chrono::{DateTime, Duration, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    struct Fixture {
        repo: Arc<InMemoryUserRepository>,
        clock: Arc<FixedClock>,
        use_case:
            VerifyAccountUseCase<InMemoryUserRepository, RecordingDispatcher, FixedClock>,
    }

    /// Register a user and capture the confirmation token from the event
    async fn registered_fixture() -> (Fixture, String, UserId) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let clock = Arc::new(FixedClock::at(t0()));

        let register = RegisterUserUseCase::new(
            Arc::clone(&repo),
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
            Arc::new(IdentityConfig::default()),
        );
        let output = register
            .execute(RegisterUserInput {
                email: "ada@example.com".to_string(),
                password: "InitialPass123!".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            })
            .await
            .unwrap();

        let token = match dispatcher.events().as_slice() {
            [DomainEvent::AccountConfirmationTokenGenerated { token_id, .. }] => {
                encode_token_id(token_id)
            }
            events => panic!("unexpected events: {:?}", events),
        };

        let use_case = VerifyAccountUseCase::new(
            Arc::clone(&repo),
            Arc::new(RecordingDispatcher::new()),
            Arc::clone(&clock),
            None,
        );
        (
            Fixture {
                repo,
                clock,
                use_case,
            },
            token,
            output.user_id,
        )
    }

    #[tokio::test]
    async fn test_verify_sets_flag_password_and_consumes_token() {
        let (f, token, user_id) = registered_fixture().await;

        let output = f
            .use_case
            .execute(VerifyAccountInput {
                token: token.clone(),
                password: "ChosenPass456!".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.user_id, user_id);

        let stored = f.repo.find_by_id(&user_id).await.unwrap().unwrap();
        assert!(stored.is_verified());
        let raw = RawPassword::new("ChosenPass456!".to_string()).unwrap();
        assert!(stored.verify_password(&raw, None));

        // Token is single use
        let again = f
            .use_case
            .execute(VerifyAccountInput {
                token,
                password: "AnotherPass789!".to_string(),
            })
            .await;
        assert_eq!(again.unwrap_err(), IdentityError::UserNotFound);
    }

    #[tokio::test]
    async fn test_expired_token_is_not_found() {
        let (f, token, _) = registered_fixture().await;
        f.clock.advance(Duration::hours(25));

        let result = f
            .use_case
            .execute(VerifyAccountInput {
                token,
                password: "ChosenPass456!".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::UserNotFound);
    }

    #[tokio::test]
    async fn test_garbage_token_is_not_found() {
        let (f, _, _) = registered_fixture().await;
        let result = f
            .use_case
            .execute(VerifyAccountInput {
                token: "!!!".to_string(),
                password: "ChosenPass456!".to_string(),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::UserNotFound);
    }
}
