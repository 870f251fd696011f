//! Identity - authentication and account-security core
//!
//! Clean Architecture structure:
//! - `domain/` - the User aggregate, value objects, capability and
//!   repository traits, domain events
//! - `application/` - one use case per command
//! - `infra/` - in-memory adapters (tests, local development)
//!
//! ## Features
//! - Password authentication with per-account lockout policy
//! - MFA across three providers: email one-time codes, authenticator-app
//!   TOTP, FIDO2 hardware devices (fixed priority Device > App > Email)
//! - Single-use, time-bound security tokens for account verification and
//!   password reset
//! - Password history enforcement on change/reset
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (`platform` crate)
//! - Email one-time codes derived from a per-user security stamp
//! - Every use case is a single load-mutate-save transaction; a failed
//!   save always wins over the domain outcome
//! - Domain events are dispatched only after a confirmed save

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
