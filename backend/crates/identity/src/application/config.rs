//! Application Configuration
//!
//! Policy knobs for the identity application layer.

use chrono::Duration;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Failed attempts tolerated before a failure trips the lock;
    /// `-1` disables lockout entirely
    pub allowed_attempts: i32,
    /// How many retired passwords the reuse check looks back over
    pub password_history_limit: usize,
    /// Lifetime of account-confirmation tokens
    pub confirmation_token_lifetime: Duration,
    /// Lifetime of requested password-reset tokens
    pub reset_token_lifetime: Duration,
    /// Lifetime of the reset token issued by an unlock (deliberately
    /// long: the user may not be at their mailbox when unlocked)
    pub unlock_reset_token_lifetime: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            allowed_attempts: 5,
            password_history_limit: 5,
            confirmation_token_lifetime: Duration::hours(24),
            reset_token_lifetime: Duration::hours(2),
            unlock_reset_token_lifetime: Duration::days(3),
            password_pepper: None,
        }
    }
}

impl IdentityConfig {
    /// Lock evaluation for a failed primary-credential check
    ///
    /// `attempts_so_far` is the counter value BEFORE this failure is
    /// recorded: with `allowed_attempts = N`, the failure that arrives
    /// when N failures are already on record is the one that locks.
    pub fn should_lock(&self, attempts_so_far: u32) -> bool {
        if self.allowed_attempts < 0 {
            return false;
        }
        attempts_so_far >= self.allowed_attempts as u32
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
