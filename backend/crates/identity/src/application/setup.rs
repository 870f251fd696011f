//! First-Run Setup Use Case
//!
//! Bootstraps the very first account. The resulting administrator is
//! already verified (there is nobody to send a confirmation to) and
//! exempt from lockout so a remote attacker cannot lock out the only
//! operator. Refuses to run once any user exists.

use std::sync::Arc;

use crate::application::commit;
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    ids::UserId,
    person_name::PersonName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{IdentityError, IdentityResult};

pub struct SetupInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug)]
pub struct SetupOutput {
    pub user_id: UserId,
}

pub struct SetupUseCase<R, C>
where
    R: UserRepository,
    C: Clock,
{
    user_repo: Arc<R>,
    clock: Arc<C>,
    config: Arc<IdentityConfig>,
}

impl<R, C> SetupUseCase<R, C>
where
    R: UserRepository,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, clock: Arc<C>, config: Arc<IdentityConfig>) -> Self {
        Self {
            user_repo,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: SetupInput) -> IdentityResult<SetupOutput> {
        if self.user_repo.any_users().await? {
            return Err(IdentityError::SystemIsAlreadySetup);
        }

        let email = Email::new(input.email)?;
        let profile = PersonName::new(input.first_name, input.last_name)?;
        let raw = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;

        let user = User::bootstrap(email, profile, password_hash, self.clock.now());
        let user_id = *user.user_id();

        self.user_repo.add(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "System bootstrapped with first user");
        Ok(SetupOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================
