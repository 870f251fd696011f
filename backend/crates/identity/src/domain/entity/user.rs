//! User Aggregate Root
//!
//! The single source of truth for a user's credential state, MFA
//! enrollments, lockout state, and pending security tokens. All fields
//! are private: handlers mutate exclusively through aggregate methods,
//! and each mutating method returns the domain events it produced so the
//! handler can dispatch them after a successful save.
//!
//! Lock policy lives outside: handlers compute the "should lock" flag
//! from configuration and pass it in. Flipping `is_disabled` from a
//! failed attempt is the only path by which the counter causes a lock,
//! and it is gated on `is_lockable`.

use crate::domain::entity::{
    authenticator_app::AuthenticatorApp,
    authenticator_device::AuthenticatorDevice,
    login_attempt::{AttemptKind, LoginAttempt},
    password_history::PasswordHistoryEntry,
    security_token::{SecurityToken, SecurityTokenPurpose},
    user_notification::UserNotification,
};
use crate::domain::event::DomainEvent;
use crate::domain::fido::RegisteredCredential;
use crate::domain::value_object::{
    email::Email,
    ids::{AuthenticatorDeviceId, NotificationId, SecurityTokenId, UserId},
    person_name::PersonName,
    security_stamp::SecurityStamp,
    totp_secret::TotpSecret,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{IdentityError, IdentityResult};
use chrono::{DateTime, Duration, Utc};
use kernel::error::app_error::AppResult;

/// User aggregate root
#[derive(Debug, Clone)]
pub struct User {
    user_id: UserId,
    email: Email,
    profile: PersonName,
    password_hash: UserPassword,
    security_stamp: SecurityStamp,
    is_verified: bool,
    is_disabled: bool,
    is_lockable: bool,
    attempts_since_last_authentication: u32,
    authenticator_apps: Vec<AuthenticatorApp>,
    authenticator_devices: Vec<AuthenticatorDevice>,
    password_histories: Vec<PasswordHistoryEntry>,
    security_tokens: Vec<SecurityToken>,
    user_notifications: Vec<UserNotification>,
    login_attempts: Vec<LoginAttempt>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a self-registered user: unverified, subject to lockout
    pub fn register(
        email: Email,
        profile: PersonName,
        password_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(email, profile, password_hash, false, true, now)
    }

    /// Create the first-run administrator: verified, exempt from lockout
    pub fn bootstrap(
        email: Email,
        profile: PersonName,
        password_hash: UserPassword,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(email, profile, password_hash, true, false, now)
    }

    fn new(
        email: Email,
        profile: PersonName,
        password_hash: UserPassword,
        is_verified: bool,
        is_lockable: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            email,
            profile,
            password_hash,
            security_stamp: SecurityStamp::generate(),
            is_verified,
            is_disabled: false,
            is_lockable,
            attempts_since_last_authentication: 0,
            authenticator_apps: Vec::new(),
            authenticator_devices: Vec::new(),
            password_histories: Vec::new(),
            security_tokens: Vec::new(),
            user_notifications: Vec::new(),
            login_attempts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn profile(&self) -> &PersonName {
        &self.profile
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn is_disabled(&self) -> bool {
        self.is_disabled
    }

    pub fn is_lockable(&self) -> bool {
        self.is_lockable
    }

    pub fn attempts_since_last_authentication(&self) -> u32 {
        self.attempts_since_last_authentication
    }

    pub fn login_attempts(&self) -> &[LoginAttempt] {
        &self.login_attempts
    }

    pub fn security_tokens(&self) -> &[SecurityToken] {
        &self.security_tokens
    }

    pub fn notifications(&self) -> &[UserNotification] {
        &self.user_notifications
    }

    /// The single active authenticator app, if one is enrolled
    pub fn active_authenticator_app(&self) -> Option<&AuthenticatorApp> {
        self.authenticator_apps.iter().find(|app| app.is_active())
    }

    /// All currently active devices
    pub fn active_devices(&self) -> impl Iterator<Item = &AuthenticatorDevice> {
        self.authenticator_devices
            .iter()
            .filter(|device| device.is_active())
    }

    /// Credential ids of every active device
    pub fn active_credential_ids(&self) -> Vec<Vec<u8>> {
        self.active_devices()
            .map(|device| device.credential_id().to_vec())
            .collect()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ========================================================================
    // Primary credential
    // ========================================================================

    /// Verify a raw password against the current hash
    pub fn verify_password(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.password_hash.verify(raw, pepper)
    }

    /// Whether the stored hash should be recomputed with current parameters
    pub fn password_needs_rehash(&self) -> bool {
        self.password_hash.needs_rehash()
    }

    /// Whether the candidate matches any of the `limit` most recently
    /// retired passwords (ordered by retirement time, newest first)
    pub fn password_in_history(
        &self,
        candidate: &RawPassword,
        limit: usize,
        pepper: Option<&[u8]>,
    ) -> bool {
        let mut entries: Vec<&PasswordHistoryEntry> = self.password_histories.iter().collect();
        entries.sort_by(|a, b| b.when_used().cmp(&a.when_used()));

        entries
            .iter()
            .take(limit)
            .any(|entry| entry.matches(candidate, pepper))
    }

    /// Replace the password, retiring the old hash into history
    pub fn change_password(&mut self, new_hash: UserPassword, now: DateTime<Utc>) -> DomainEvent {
        let old_hash = std::mem::replace(&mut self.password_hash, new_hash);
        self.password_histories
            .push(PasswordHistoryEntry::new(old_hash, now));
        self.touch(now);

        DomainEvent::PasswordChanged {
            email: self.email.clone(),
            profile: self.profile.clone(),
        }
    }

    // ========================================================================
    // Attempt journal & lockout
    // ========================================================================

    /// Record a failed primary-credential check
    ///
    /// Always increments the failure counter. When `should_lock` is set
    /// and the account is lockable, the account is additionally disabled
    /// and the disabling event is returned.
    pub fn record_failed_attempt(
        &mut self,
        should_lock: bool,
        now: DateTime<Utc>,
    ) -> Option<DomainEvent> {
        self.attempts_since_last_authentication += 1;
        self.login_attempts
            .push(LoginAttempt::new(AttemptKind::Failed, now));
        self.touch(now);

        if should_lock && self.is_lockable && !self.is_disabled {
            self.is_disabled = true;
            return Some(DomainEvent::UserDisabled {
                email: self.email.clone(),
            });
        }
        None
    }

    /// Record a partial success: password accepted, MFA step pending.
    /// The primary credential check succeeded, so accumulated failures
    /// are cleared here; a later failed MFA step never restores them.
    pub fn record_mfa_requested(&mut self, kind: AttemptKind, now: DateTime<Utc>) {
        self.attempts_since_last_authentication = 0;
        self.login_attempts.push(LoginAttempt::new(kind, now));
        self.touch(now);
    }

    /// Record full authentication success, clearing accumulated failures
    pub fn record_successful_authentication(&mut self, now: DateTime<Utc>) {
        self.attempts_since_last_authentication = 0;
        self.login_attempts
            .push(LoginAttempt::new(AttemptKind::Succeeded, now));
        self.touch(now);
    }

    /// Record a failed email MFA code; never resets the failure counter
    pub fn record_email_mfa_failure(&mut self, now: DateTime<Utc>) {
        self.login_attempts
            .push(LoginAttempt::new(AttemptKind::EmailMfaFailed, now));
        self.touch(now);
    }

    // ========================================================================
    // Account state
    // ========================================================================

    pub fn disable(&mut self, now: DateTime<Utc>) -> IdentityResult<DomainEvent> {
        if self.is_disabled {
            return Err(IdentityError::UserAlreadyDisabled);
        }
        self.is_disabled = true;
        self.touch(now);

        Ok(DomainEvent::UserDisabled {
            email: self.email.clone(),
        })
    }

    pub fn enable(&mut self, now: DateTime<Utc>) -> IdentityResult<DomainEvent> {
        if !self.is_disabled {
            return Err(IdentityError::UserNotDisabled);
        }
        self.is_disabled = false;
        self.touch(now);

        Ok(DomainEvent::UserEnabled {
            email: self.email.clone(),
        })
    }

    /// Clear the lock unconditionally and force a credential refresh by
    /// issuing a long-lived password-reset token. The failure counter is
    /// left as-is; only a successful authentication clears it.
    pub fn unlock(&mut self, reset_lifetime: Duration, now: DateTime<Utc>) -> DomainEvent {
        self.is_disabled = false;
        let (_, event) =
            self.issue_security_token(SecurityTokenPurpose::PasswordReset, reset_lifetime, now);
        event
    }

    /// Mark the account verified (email ownership proven)
    pub fn verify_account(&mut self, now: DateTime<Utc>) -> IdentityResult<()> {
        if self.is_verified {
            return Err(IdentityError::UserIsAlreadyVerified);
        }
        self.is_verified = true;
        self.touch(now);
        Ok(())
    }

    // ========================================================================
    // Security tokens
    // ========================================================================

    /// Issue a fresh single-use token; prior tokens stay untouched
    pub fn issue_security_token(
        &mut self,
        purpose: SecurityTokenPurpose,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> (SecurityTokenId, DomainEvent) {
        let token = SecurityToken::issue(purpose, lifetime, now);
        let token_id = *token.id();
        self.security_tokens.push(token);
        self.touch(now);

        let event = match purpose {
            SecurityTokenPurpose::AccountConfirmation => {
                DomainEvent::AccountConfirmationTokenGenerated {
                    email: self.email.clone(),
                    profile: self.profile.clone(),
                    token_id,
                }
            }
            SecurityTokenPurpose::PasswordReset => DomainEvent::PasswordResetTokenGenerated {
                email: self.email.clone(),
                profile: self.profile.clone(),
                token_id,
            },
        };

        (token_id, event)
    }

    /// Find a token usable at `now`
    pub fn usable_security_token(
        &self,
        token_id: &SecurityTokenId,
        now: DateTime<Utc>,
    ) -> Option<&SecurityToken> {
        self.security_tokens
            .iter()
            .find(|token| token.id() == token_id && token.is_usable(now))
    }

    /// Complete a token's lifecycle. A miss is reported as `UserNotFound`
    /// so callers cannot probe which token ids exist.
    pub fn consume_security_token(
        &mut self,
        token_id: &SecurityTokenId,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        let token = self
            .security_tokens
            .iter_mut()
            .find(|token| token.id() == token_id && token.is_usable(now))
            .ok_or(IdentityError::UserNotFound)?;

        token.consume(now);
        self.touch(now);
        Ok(())
    }

    // ========================================================================
    // Authenticator app (TOTP)
    // ========================================================================

    /// Append a verified app enrollment; at most one active app
    pub fn enroll_authenticator_app(
        &mut self,
        shared_key: TotpSecret,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        if self.active_authenticator_app().is_some() {
            return Err(IdentityError::AuthenticatorAppAlreadyEnrolled);
        }
        self.authenticator_apps
            .push(AuthenticatorApp::enroll(shared_key, now));
        self.touch(now);
        Ok(())
    }

    /// Tombstone the active app
    pub fn revoke_authenticator_app(&mut self, now: DateTime<Utc>) -> IdentityResult<()> {
        let app = self
            .authenticator_apps
            .iter_mut()
            .find(|app| app.is_active())
            .ok_or(IdentityError::NoAuthenticatorAppEnrolled)?;

        app.revoke(now);
        self.touch(now);
        Ok(())
    }

    // ========================================================================
    // Authenticator devices (FIDO2)
    // ========================================================================

    /// Append a verified device registration
    pub fn enroll_authenticator_device(
        &mut self,
        credential: RegisteredCredential,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.authenticator_devices
            .push(AuthenticatorDevice::register(credential, name, now));
        self.touch(now);
    }

    /// Tombstone a device by its id
    pub fn revoke_authenticator_device(
        &mut self,
        device_id: &AuthenticatorDeviceId,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        let device = self
            .authenticator_devices
            .iter_mut()
            .find(|device| device.id() == device_id)
            .ok_or(IdentityError::DeviceNotFound)?;

        device.revoke(now);
        self.touch(now);
        Ok(())
    }

    /// Persist the counter returned by a verified assertion
    pub fn record_device_counter(
        &mut self,
        credential_id: &[u8],
        new_counter: u32,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        let device = self
            .authenticator_devices
            .iter_mut()
            .find(|device| device.is_active() && device.credential_id() == credential_id)
            .ok_or(IdentityError::DeviceNotFound)?;

        device.record_counter(new_counter);
        self.touch(now);
        Ok(())
    }

    // ========================================================================
    // Email MFA
    // ========================================================================

    /// Produce the email one-time code for dispatch
    pub fn email_mfa_code(&self, now: DateTime<Utc>) -> AppResult<String> {
        self.security_stamp.email_code(now)
    }

    /// Check a submitted email one-time code
    pub fn verify_email_mfa_code(&self, code: &str, now: DateTime<Utc>) -> AppResult<bool> {
        self.security_stamp.verify_email_code(code, now)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Attach a new notification and return its id
    pub fn add_notification(&mut self, now: DateTime<Utc>) -> NotificationId {
        let notification = UserNotification::new(now);
        let notification_id = *notification.id();
        self.user_notifications.push(notification);
        self.touch(now);
        notification_id
    }

    pub fn mark_notification_viewed(
        &mut self,
        notification_id: &NotificationId,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        self.find_notification(notification_id)?.mark_viewed(now);
        self.touch(now);
        Ok(())
    }

    pub fn dismiss_notification(
        &mut self,
        notification_id: &NotificationId,
        now: DateTime<Utc>,
    ) -> IdentityResult<()> {
        self.find_notification(notification_id)?.dismiss(now);
        self.touch(now);
        Ok(())
    }

    fn find_notification(
        &mut self,
        notification_id: &NotificationId,
    ) -> IdentityResult<&mut UserNotification> {
        self.user_notifications
            .iter_mut()
            .find(|notification| notification.id() == notification_id)
            .ok_or(IdentityError::UserNotificationNotFound)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

// ============================================================================
// Tests
// ============================================================================
