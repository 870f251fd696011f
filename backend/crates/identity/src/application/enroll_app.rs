//! Enroll Authenticator App Use Case
//!
//! Two-step flow: `initiate` hands out a fresh shared key without
//! touching any aggregate; `execute` commits the enrollment only after
//! the caller proves possession by submitting a code generated from
//! that key.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::totp_secret::TotpSecret;
use crate::error::{IdentityError, IdentityResult};

pub struct EnrollAppInput {
    /// The Base32 key previously handed out by `initiate`
    pub shared_key: String,
    /// Code the caller's app generated from that key
    pub code: String,
}

pub struct EnrollAppUseCase<R, S, C>
where
    R: UserRepository,
    S: CurrentSession,
    C: Clock,
{
    user_repo: Arc<R>,
    session: Arc<S>,
    clock: Arc<C>,
}

impl<R, S, C> EnrollAppUseCase<R, S, C>
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

    /// Generate a fresh shared key for the caller to load into their app.
    /// Nothing is persisted until the key is proven via `execute`.
    pub fn initiate() -> String {
        TotpSecret::generate().as_base32().to_string()
    }

    pub async fn execute(&self, input: EnrollAppInput) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if user.active_authenticator_app().is_some() {
            return Err(IdentityError::AuthenticatorAppAlreadyEnrolled);
        }

        let shared_key = TotpSecret::from_base32(input.shared_key)
            .map_err(|_| IdentityError::FailedVerifyingAuthenticatorCode)?;

        let now = self.clock.now();
        if !shared_key.verify(&input.code, now)? {
            return Err(IdentityError::FailedVerifyingAuthenticatorCode);
        }

        user.enroll_authenticator_app(shared_key, now)?;
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "Authenticator app enrolled");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
