//! Request Password Reset Use Case
//!
//! Issues a reset token for a known account and hands the token event to
//! the dispatcher for mail delivery. A disabled account gets no token;
//! an unknown email gets the same generic not-found every credential
//! failure produces.

use std::sync::Arc;

use crate::application::commit;
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::entity::security_token::SecurityTokenPurpose;
use crate::domain::event::EventDispatcher;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{IdentityError, IdentityResult};

pub struct RequestPasswordResetInput {
    pub email: String,
}

pub struct RequestPasswordResetUseCase<R, D, C>
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

impl<R, D, C> RequestPasswordResetUseCase<R, D, C>
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

    pub async fn execute(&self, input: RequestPasswordResetInput) -> IdentityResult<()> {
        let email = Email::new(&input.email).map_err(|_| IdentityError::UserNotFound)?;
        let mut user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.is_disabled() {
            return Err(IdentityError::AccountIsDisabled);
        }

        let (_, event) = user.issue_security_token(
            SecurityTokenPurpose::PasswordReset,
            self.config.reset_token_lifetime,
            self.clock.now(),
        );

        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&[event]).await {
            error.log();
        }

        tracing::info!(user_id = %user.user_id(), "Password reset requested");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
