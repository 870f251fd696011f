//! Enroll Authenticator Device Use Case
//!
//! Two-step WebAuthn registration: `options` builds a challenge that
//! excludes every credential the user already holds; `execute` lets the
//! engine verify the attestation (including credential uniqueness) and
//! appends the resulting device.

use std::sync::Arc;

use crate::application::{commit, session_user_id};
use crate::domain::actor::CurrentSession;
use crate::domain::clock::Clock;
use crate::domain::fido::{AttestationResponse, DeviceRegistrationOptions, Fido2Engine};
use crate::domain::repository::UserRepository;
use crate::error::{IdentityError, IdentityResult};

pub struct EnrollDeviceInput {
    /// Friendly name shown in the device list
    pub name: String,
    pub attestation: AttestationResponse,
}

pub struct EnrollDeviceUseCase<R, F, S, C>
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

impl<R, F, S, C> EnrollDeviceUseCase<R, F, S, C>
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

    /// Build registration options; no aggregate mutation
    pub async fn options(&self) -> IdentityResult<DeviceRegistrationOptions> {
        let user_id = session_user_id(&*self.session)?;
        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        self.fido_engine
            .registration_options(&user.active_credential_ids())
            .await
    }

    pub async fn execute(&self, input: EnrollDeviceInput) -> IdentityResult<()> {
        let user_id = session_user_id(&*self.session)?;
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        let credential = self
            .fido_engine
            .verify_registration(&input.attestation, &user.active_credential_ids())
            .await?;

        user.enroll_authenticator_device(credential, input.name, self.clock.now());
        self.user_repo.update(&user).await?;
        commit(&*self.user_repo).await?;

        tracing::info!(user_id = %user_id, "Authenticator device enrolled");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::CurrentActor;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::{
        email::Email,
        person_name::PersonName,
        user_password::{RawPassword, UserPassword},
    };
    use crate::infra::memory::{
        FixedClock, InMemoryFido2Engine, InMemoryUserRepository, StaticSession,
    };
    use chrono::{DateTime, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn user() -> User {
        let raw = RawPassword::new("SomePassword123!".to_string()).unwrap();
        User::register(
            Email::new("ada@example.com").unwrap(),
            PersonName::new("Ada", "Lovelace").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            t0(),
        )
    }

    fn attestation(credential_id: &[u8]) -> AttestationResponse {
        AttestationResponse {
            credential_id: credential_id.to_vec(),
            attestation_object: b"public-key".to_vec(),
            client_data_json: b"{}".to_vec(),
        }
    }

    async fn fixture(
        user: &User,
    ) -> (
        Arc<InMemoryUserRepository>,
        EnrollDeviceUseCase<InMemoryUserRepository, InMemoryFido2Engine, StaticSession, FixedClock>,
    ) {
        let repo = Arc::new(InMemoryUserRepository::new());
        repo.add(user).await.unwrap();
        repo.save_changes().await;
        let session = Arc::new(StaticSession::with_actor(CurrentActor::Authenticated {
            user_id: *user.user_id(),
            email: user.email().clone(),
            profile: user.profile().clone(),
        }));
        let uc = EnrollDeviceUseCase::new(
            Arc::clone(&repo),
            Arc::new(InMemoryFido2Engine::new()),
            session,
            Arc::new(FixedClock::at(t0())),
        );
        (repo, uc)
    }

    #[tokio::test]
    async fn test_enroll_device() {
        let user = user();
        let (repo, uc) = fixture(&user).await;

        uc.execute(EnrollDeviceInput {
            name: "YubiKey".to_string(),
            attestation: attestation(b"cred-1"),
        })
        .await
        .unwrap();

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        let device = stored.active_devices().next().unwrap();
        assert_eq!(device.name(), "YubiKey");
        assert_eq!(device.credential_id(), b"cred-1");
    }

    #[tokio::test]
    async fn test_duplicate_credential_rejected() {
        let user = user();
        let (repo, uc) = fixture(&user).await;

        uc.execute(EnrollDeviceInput {
            name: "YubiKey".to_string(),
            attestation: attestation(b"cred-1"),
        })
        .await
        .unwrap();

        let result = uc
            .execute(EnrollDeviceInput {
                name: "Duplicate".to_string(),
                attestation: attestation(b"cred-1"),
            })
            .await;
        assert_eq!(result.unwrap_err(), IdentityError::FidoVerificationFailed);

        let stored = repo.find_by_id(user.user_id()).await.unwrap().unwrap();
        assert_eq!(stored.active_devices().count(), 1);
    }

    #[tokio::test]
    async fn test_options_exclude_existing_credentials() {
        let user = user();
        let (_, uc) = fixture(&user).await;

        uc.execute(EnrollDeviceInput {
            name: "YubiKey".to_string(),
            attestation: attestation(b"cred-1"),
        })
        .await
        .unwrap();

        let options = uc.options().await.unwrap();
        assert_eq!(options.excluded_credential_ids, vec![b"cred-1".to_vec()]);
    }
}
