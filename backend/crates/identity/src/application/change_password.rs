//! Change Password Use Case
//!
//! Authenticated credential change: current password re-proof, reuse
//! window check, then the swap. The old hash lands in history as part of
//! the same aggregate mutation.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::application::config::IdentityConfig;
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{IdentityError, IdentityResult};

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<R, D, S, C>
where
    R: UserRepository,
    D: EventDispatcher,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    dispatcher: Arc<D>,
    session: Arc<S>,
    clock: Arc<C>,
    config: Arc<IdentityConfig>,
}

impl<R, D, S, C> ChangePasswordUseCase<R, D, S, C>
where
    R: UserRepository,
    D: EventDispatcher,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(
        user_repo: Arc<R>,
        dispatcher: Arc<D>,
        session: Arc<S>,
        clock: Arc<C>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            user_repo,
            dispatcher,
            session,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: ChangePasswordInput) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let current_matches = RawPassword::new(input.current_password)
            .map(|raw| user.verify_password(&raw, self.config.pepper()))
            .unwrap_or(false);
        if !current_matches {
            return Err(IdentityError::PasswordNotCorrect);
        }

        let raw = RawPassword::new(input.new_password)?;
        if user.password_in_history(&raw, self.config.password_history_limit, self.config.pepper())
        {
            return Err(IdentityError::PasswordInHistory);
        }

        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;
        let event = user.change_password(password_hash, self.clock.now());

        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
