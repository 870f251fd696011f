//! In-Memory Boundary Implementations
//!
//! A staged in-memory user store with unit-of-work semantics, a
//! deterministic FIDO2 engine, a settable clock, a recording event
//! dispatcher, and a static session context.

use crate::domain::actor::{CurrentActor, CurrentSession};
use crate::domain::clock::Clock;
use crate::domain::entity::user::User;
use crate::domain::event::{DomainEvent, EventDispatcher};
use crate::domain::fido::{
    AssertionResponse, AttestationResponse, DeviceAssertionOptions, DeviceRegistrationOptions,
    Fido2Engine, RegisteredCredential,
};
use crate::domain::repository::{SaveResult, UserRepository};
use crate::domain::value_object::{
    email::Email,
    ids::{SecurityTokenId, UserId},
};
use crate::error::{IdentityError, IdentityResult};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// User Repository
// ============================================================================

#[derive(Default)]
struct RepositoryState {
    committed: HashMap<Uuid, User>,
    staged_adds: Vec<User>,
    staged_updates: Vec<User>,
    fail_next_save: bool,
}

/// Staged in-memory user store
///
/// `add`/`update` stage aggregates; nothing is visible to reads until
/// `save_changes` commits the whole batch. `fail_next_save` simulates a
/// store failure (the batch is dropped, matching "nothing persisted").
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<RepositoryState>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save_changes` report a failure
    pub fn fail_next_save(&self) {
        lock(&self.state).fail_next_save = true;
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        Ok(lock(&self.state).committed.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>> {
        Ok(lock(&self.state)
            .committed
            .values()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn find_by_security_token(
        &self,
        token_id: &SecurityTokenId,
        as_of: DateTime<Utc>,
    ) -> IdentityResult<Option<User>> {
        Ok(lock(&self.state)
            .committed
            .values()
            .find(|user| user.usable_security_token(token_id, as_of).is_some())
            .cloned())
    }

    async fn any_users(&self) -> IdentityResult<bool> {
        Ok(!lock(&self.state).committed.is_empty())
    }

    async fn add(&self, user: &User) -> IdentityResult<()> {
        lock(&self.state).staged_adds.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> IdentityResult<()> {
        lock(&self.state).staged_updates.push(user.clone());
        Ok(())
    }

    async fn save_changes(&self) -> SaveResult {
        let mut state = lock(&self.state);

        let adds = std::mem::take(&mut state.staged_adds);
        let updates = std::mem::take(&mut state.staged_updates);

        if state.fail_next_save {
            state.fail_next_save = false;
            return SaveResult::Failure;
        }

        // Email uniqueness across committed users and within the batch
        for (index, add) in adds.iter().enumerate() {
            let duplicate_committed = state
                .committed
                .values()
                .any(|user| user.email() == add.email());
            let duplicate_staged = adds[..index].iter().any(|user| user.email() == add.email());
            if duplicate_committed || duplicate_staged {
                return SaveResult::UniquenessViolation;
            }
        }

        for user in adds {
            state.committed.insert(*user.user_id().as_uuid(), user);
        }
        for user in updates {
            state.committed.insert(*user.user_id().as_uuid(), user);
        }

        SaveResult::Committed
    }
}

// ============================================================================
// FIDO2 Engine
// ============================================================================

/// Deterministic FIDO2 engine
///
/// Stands in for a real WebAuthn library: the attestation object is
/// taken verbatim as the public key, and an assertion verifies when its
/// signature equals the stored public key. Enforces credential
/// uniqueness and a forward-moving counter.
#[derive(Default)]
pub struct InMemoryFido2Engine;

impl InMemoryFido2Engine {
    pub fn new() -> Self {
        Self
    }

    fn challenge() -> Vec<u8> {
        let mut bytes = vec![0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        bytes
    }
}

impl Fido2Engine for InMemoryFido2Engine {
    async fn registration_options(
        &self,
        existing_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<DeviceRegistrationOptions> {
        Ok(DeviceRegistrationOptions {
            challenge: Self::challenge(),
            excluded_credential_ids: existing_credential_ids.to_vec(),
        })
    }

    async fn verify_registration(
        &self,
        attestation: &AttestationResponse,
        existing_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<RegisteredCredential> {
        if existing_credential_ids.contains(&attestation.credential_id) {
            return Err(IdentityError::FidoVerificationFailed);
        }
        if attestation.attestation_object.is_empty() {
            return Err(IdentityError::FidoVerificationFailed);
        }

        Ok(RegisteredCredential {
            credential_id: attestation.credential_id.clone(),
            public_key: attestation.attestation_object.clone(),
            aaguid: Uuid::new_v4(),
            signature_counter: 0,
            credential_type: "public-key".to_string(),
        })
    }

    async fn assertion_options(
        &self,
        allowed_credential_ids: &[Vec<u8>],
    ) -> IdentityResult<DeviceAssertionOptions> {
        Ok(DeviceAssertionOptions {
            challenge: Self::challenge(),
            allowed_credential_ids: allowed_credential_ids.to_vec(),
        })
    }

    async fn verify_assertion(
        &self,
        assertion: &AssertionResponse,
        public_key: &[u8],
        signature_counter: u32,
    ) -> IdentityResult<u32> {
        if assertion.signature != public_key {
            return Err(IdentityError::FidoVerificationFailed);
        }
        Ok(signature_counter + 1)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Settable clock for deterministic time-based tests
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.now) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}

// ============================================================================
// Event Dispatcher
// ============================================================================

/// Dispatcher that records everything it receives
#[derive(Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        lock(&self.events).clone()
    }
}

impl EventDispatcher for RecordingDispatcher {
    async fn dispatch(&self, events: &[DomainEvent]) -> IdentityResult<()> {
        lock(&self.events).extend_from_slice(events);
        Ok(())
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Session context with a swappable actor
#[derive(Default)]
pub struct StaticSession {
    actor: Mutex<Option<CurrentActor>>,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_actor(actor: CurrentActor) -> Self {
        Self {
            actor: Mutex::new(Some(actor)),
        }
    }

    pub fn set_actor(&self, actor: Option<CurrentActor>) {
        *lock(&self.actor) = actor;
    }
}

impl CurrentSession for StaticSession {
    fn current_actor(&self) -> Option<CurrentActor> {
        lock(&self.actor).clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
