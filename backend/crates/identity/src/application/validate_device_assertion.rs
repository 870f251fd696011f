//! Validate Device Assertion Use Case
//!
//! Completes a FIDO2 login challenge. The engine owns signature and
//! counter verification; this layer matches the credential to an active
//! device and persists the counter the engine hands back.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::fido::{AssertionResponse, Fido2Engine};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::UserId;
use crate::error::{IdentityError, IdentityResult};

pub struct ValidateDeviceAssertionInput {
    pub assertion: AssertionResponse,
}

#[derive(Debug)]
pub struct ValidateDeviceAssertionOutput {
    /// Fully authenticated user
    pub user_id: UserId,
}

pub struct ValidateDeviceAssertionUseCase<R, F, S, C>
where
    R: UserRepository,
    F: Fido2Engine,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    fido_engine: Arc<F>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, F, S, C> ValidateDeviceAssertionUseCase<R, F, S, C>
where
    R: UserRepository,
    F: Fido2Engine,
    S: CurrentSession,
    C: Clock,
{
    pub fn new(user_repo: Arc<R>, fido_engine: Arc<F>, session: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            user_repo,
            fido_engine,
            session,
            clock,
        }
    }

    pub async fn execute(
        &self,
        input: ValidateDeviceAssertionInput,
    ) -> IdentityResult<ValidateDeviceAssertionOutput> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let (public_key, counter) = user
            .active_devices()
            .find(|device| device.credential_id() == input.assertion.credential_id)
            .map(|device| (device.public_key().to_vec(), device.signature_counter()))
            .ok_or(IdentityError::DeviceNotFound)?;

        let new_counter = self
            .fido_engine
            .verify_assertion(&input.assertion, &public_key, counter)
            .await?;

        let now = self.clock.now();
        user.record_device_counter(&input.assertion.credential_id, new_counter, now)?;
        user.record_successful_authentication(now);

        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "Device MFA completed");
        Ok(ValidateDeviceAssertionOutput { user_id })
    }
}

// ============================================================================
// Tests
// ============================================================================
