//! Authenticate Use Case
//!
//! Primary credential check plus the MFA fan-out. On a password match
//! the next step is chosen in fixed priority order Device, then App,
//! then Email; the Email provider is always reported as an available
//! fallback. Failures record an attempt on the aggregate before the
//! error surfaces, and a lock tripped by this failure is dispatched as
//! a user-disabled event.

use std::sync::Arc;

use crate::application::commit;
use crate::application::config::IdentityConfig;
use crate::domain::clock::Clock;
use crate::domain::entity::login_attempt::AttemptKind;
use crate::domain::entity::user::User;
use crate::domain::event::{DomainEvent, EventDispatcher};
use crate::domain::fido::{DeviceAssertionOptions, Fido2Engine};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    authentication_state::AuthenticationState,
    email::Email,
    ids::UserId,
    mfa_provider::{MfaProvider, MfaProviders},
    user_password::RawPassword,
};
use crate::error::{IdentityError, IdentityResult};

/// Authenticate input
pub struct AuthenticateInput {
    pub email: String,
    pub password: String,
}

/// Authenticate output
#[derive(Debug)]
pub struct AuthenticateOutput {
    pub user_id: UserId,
    /// The required next step
    pub state: AuthenticationState,
    /// Every provider the caller may offer as an alternative
    pub providers: MfaProviders,
    /// Present only when the device path is the live state
    pub assertion_options: Option<DeviceAssertionOptions>,
}

/// Authenticate use case
pub struct AuthenticateUseCase<R, F, D, C>
where
    R: UserRepository,
    F: Fido2Engine,
    D: EventDispatcher,
    C: Clock,
{
    user_repo: Arc<R>,
    fido_engine: Arc<F>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    config: Arc<IdentityConfig>,
}

impl<R, F, D, C> AuthenticateUseCase<R, F, D, C>
where
    R: UserRepository,
    F: Fido2Engine,
    D: EventDispatcher,
    C: Clock,
{
    pub fn new(
        user_repo: Arc<R>,
        fido_engine: Arc<F>,
        dispatcher: Arc<D>,
        clock: Arc<C>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            user_repo,
            fido_engine,
            dispatcher,
            clock,
            config,
        }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> IdentityResult<AuthenticateOutput> {
        let email = Email::new(&input.email).map_err(|_| IdentityError::UserNotFound)?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.is_disabled() {
            // No lock evaluation: the account is already out of play
            return Err(self
                .record_failure(user, false, IdentityError::AccountIsDisabled)
                .await);
        }

        let should_lock = self
            .config
            .should_lock(user.attempts_since_last_authentication());

        if !user.is_verified() {
            return Err(self
                .record_failure(user, should_lock, IdentityError::AccountNotVerified)
                .await);
        }

        let password_matches = RawPassword::new(input.password)
            .map(|raw| user.verify_password(&raw, self.config.pepper()))
            .unwrap_or(false);

        if !password_matches {
            return Err(self
                .record_failure(user, should_lock, IdentityError::AuthenticationFailed)
                .await);
        }

        if user.password_needs_rehash() {
            tracing::info!(user_id = %user.user_id(), "Password hash uses outdated parameters");
        }

        self.fan_out(user).await
    }

    /// Choose the next MFA step: Device, then App, then Email
    async fn fan_out(&self, mut user: User) -> IdentityResult<AuthenticateOutput> {
        let now = self.clock.now();
        let mut providers = MfaProviders::NONE;
        // Email is always a valid fallback
        providers.insert(MfaProvider::Email);

        let mut state = AuthenticationState::Unknown;
        let mut assertion_options = None;
        let mut events = Vec::new();

        let credential_ids = user.active_credential_ids();
        if !credential_ids.is_empty() {
            match self.fido_engine.assertion_options(&credential_ids).await {
                Ok(options) => {
                    providers.insert(MfaProvider::Device);
                    state = AuthenticationState::AwaitingMfaDeviceCode;
                    assertion_options = Some(options);
                    user.record_mfa_requested(AttemptKind::DeviceMfaRequested, now);
                }
                Err(error) => {
                    // Fall through to the next provider
                    error.log();
                }
            }
        }

        if user.active_authenticator_app().is_some() {
            providers.insert(MfaProvider::App);
            if state == AuthenticationState::Unknown {
                state = AuthenticationState::AwaitingMfaAppCode;
                user.record_mfa_requested(AttemptKind::AppMfaRequested, now);
            }
        }

        if state == AuthenticationState::Unknown {
            let code = user.email_mfa_code(now)?;
            events.push(DomainEvent::EmailMfaCodeGenerated {
                email: user.email().clone(),
                profile: user.profile().clone(),
                code,
            });
            state = AuthenticationState::AwaitingMfaEmailCode;
            user.record_mfa_requested(AttemptKind::EmailMfaRequested, now);
        }

        let user_id = *user.user_id();
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        if let Err(error) = self.dispatcher.dispatch(&events).await {
            error.log();
        }

        tracing::info!(
            user_id = %user_id,
            state = %state,
            "Primary credential accepted, MFA pending"
        );

        Ok(AuthenticateOutput {
            user_id,
            state,
            providers,
            assertion_options,
        })
    }

    /// Record a failed attempt, commit, and hand back the domain error
    /// (a failed commit overrides it)
    async fn record_failure(
        &self,
        mut user: User,
        should_lock: bool,
        error: IdentityError,
    ) -> IdentityError {
        let now = self.clock.now();
        let lock_event = user.record_failed_attempt(should_lock, now);

        if let Err(save_error) = self.user_repo.update(&user).await {
            return save_error;
        }
        if let Err(save_error) = commit(&*self.user_repo).await {
            return save_error;
        }

        if let Some(event) = lock_event {
            tracing::warn!(user_id = %user.user_id(), "Account locked after repeated failures");
            if let Err(dispatch_error) = self.dispatcher.dispatch(&[event]).await {
                dispatch_error.log();
            }
        }

        error
    }
}

// ============================================================================
// Tests
// ============================================================================
