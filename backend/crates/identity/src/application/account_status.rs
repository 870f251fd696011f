//! Account Status Use Cases
//!
//! Administrative disable, enable, and unlock. Disable and enable are
//! guarded state flips; unlock is unconditional and always forces a
//! credential refresh by issuing a long-lived reset token.

use std::sync::Arc;

use crate::application::commit;
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::UserId;
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// Disable
// ============================================================================

pub struct DisableUserUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    user_repo: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> DisableUserUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, dispatcher: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            dispatcher,
            clock,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let event = user.disable(self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "Account disabled");
        Ok(())
    }
}

// ============================================================================
// Enable
// ============================================================================

pub struct EnableUserUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    user_repo: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> EnableUserUseCase<R, D, C>
where
    R: UserRepository,
    D: EventDispatcher,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, dispatcher: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            dispatcher,
            clock,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let event = user.enable(self.clock.now())?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "Account enabled");
        Ok(())
    }
}

// ============================================================================
// Unlock
// ============================================================================

pub struct UnlockUserUseCase<R, D, C>
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

impl<R, D, C> UnlockUserUseCase<R, D, C>
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

    pub async fn execute(&self, user_id: &UserId) -> IdentityResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let event = user.unlock(self.config.unlock_reset_token_lifetime, self.clock.now());
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user_id, "Account unlocked");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
