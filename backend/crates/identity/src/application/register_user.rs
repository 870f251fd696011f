//! Register User Use Case
//!
//! Self-service registration: the account starts unverified and
//! lockable, and a confirmation token goes out for the mailbox-ownership
//! proof. A duplicate email surfaces as `UserAlreadyExists` via the
//! save's uniqueness outcome, not a pre-check, so concurrent
//! registrations cannot race past each other.

use std::sync::Arc;

use crate::application::commit;
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::entity::security_token::SecurityTokenPurpose;
use crate::domain::entity::user::User;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    ids::UserId,
    person_name::PersonName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::IdentityResult;

pub struct RegisterUserInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug)]
pub struct RegisterUserOutput {
    pub user_id: UserId,
}

pub struct RegisterUserUseCase<R, D, C>
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

impl<R, D, C> RegisterUserUseCase<R, D, C>
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

    pub async fn execute(&self, input: RegisterUserInput) -> IdentityResult<RegisterUserOutput> {
        let email = Email::new(input.email)?;
        let profile = PersonName::new(input.first_name, input.last_name)?;
        let raw = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;

        let now = self.clock.now();
        let mut user = User::register(email, profile, password_hash, now);
        let (_, event) = user.issue_security_token(
            SecurityTokenPurpose::AccountConfirmation,
            self.config.confirmation_token_lifetime,
            now,
        );

        let user_id = *user.user_id();
        self.user_repo.add(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "User registered");
        Ok(RegisterUserOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================
