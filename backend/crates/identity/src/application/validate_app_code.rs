//! Validate App Code Use Case
//!
//! Checks an authenticator-app TOTP code against the single active
//! enrollment with the tight verification window. A wrong code is a
//! terminal failure for the request; unlike the email path it leaves no
//! journal entry.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::UserId;
use crate::error::{IdentityError, IdentityResult};

pub struct ValidateAppCodeInput {
    pub code: String,
}

#[derive(Debug)]
pub struct ValidateAppCodeOutput {
    /// Fully authenticated user
    pub user_id: UserId,
}

pub struct ValidateAppCodeUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> ValidateAppCodeUseCase<R, S, C>
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
        input: ValidateAppCodeInput,
    ) -> IdentityResult<ValidateAppCodeOutput> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let now = self.clock.now();
        let app = user
            .active_authenticator_app()
            .ok_or(IdentityError::NoAuthenticatorAppEnrolled)?;

        if !app.shared_key().verify(&input.code, now)? {
            return Err(IdentityError::MfaCodeNotValid);
        }

        user.record_successful_authentication(now);
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "App MFA completed");
        Ok(ValidateAppCodeOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================
