//! User Repository Boundary
//!
//! The aggregate is loaded and stored whole. Mutations are staged with
//! `add`/`update` and only become visible after `save_changes`, which
//! reports the outcome as data so handlers can translate a uniqueness
//! violation into a domain error and everything else into
//! `SavingChanges`.

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    email::Email,
    ids::{SecurityTokenId, UserId},
};
use crate::error::IdentityResult;
use chrono::{DateTime, Utc};

/// Outcome of committing staged changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// All staged changes are durable
    Committed,
    /// A uniqueness rule (email) was violated by a staged add or update
    UniquenessViolation,
    /// The store failed; nothing was persisted
    Failure,
}

/// Persistence boundary for the User aggregate
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> IdentityResult<Option<User>>;

    /// Find the user holding a security token that is usable at `as_of`
    /// (not expired, not consumed)
    async fn find_by_security_token(
        &self,
        token_id: &SecurityTokenId,
        as_of: DateTime<Utc>,
    ) -> IdentityResult<Option<User>>;

    /// Whether any user exists at all (first-run setup guard)
    async fn any_users(&self) -> IdentityResult<bool>;

    /// Stage a new aggregate for insertion
    async fn add(&self, user: &User) -> IdentityResult<()>;

    /// Stage an updated aggregate
    async fn update(&self, user: &User) -> IdentityResult<()>;

    /// Commit all staged changes as one unit of work
    async fn save_changes(&self) -> SaveResult;
}
