//! Identity Error Types
//!
//! The full typed failure taxonomy of the core. Every use case returns
//! these; nothing domain-level is ever thrown across the handler boundary.
//! Messages stay generic on purpose: credential failures must not leak
//! whether the account exists or which part of the credential was wrong.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    // ------------------------------------------------------------------
    // Not-found class
    // ------------------------------------------------------------------
    /// No user for the given id/email/token, or no session context
    #[error("User not found")]
    UserNotFound,

    /// No authenticator device with the given id or credential id
    #[error("Device not found")]
    DeviceNotFound,

    /// No notification with the given id on this user
    #[error("Notification not found")]
    UserNotificationNotFound,

    // ------------------------------------------------------------------
    // State-conflict class
    // ------------------------------------------------------------------
    /// Disable requested for an already-disabled account
    #[error("User is already disabled")]
    UserAlreadyDisabled,

    /// Enable requested for an account that is not disabled
    #[error("User is not disabled")]
    UserNotDisabled,

    /// Account verification requested for a verified account
    #[error("User is already verified")]
    UserIsAlreadyVerified,

    /// A second authenticator app cannot be enrolled while one is active
    #[error("An authenticator app is already enrolled")]
    AuthenticatorAppAlreadyEnrolled,

    /// The operation needs an active authenticator app
    #[error("No authenticator app is enrolled")]
    NoAuthenticatorAppEnrolled,

    // ------------------------------------------------------------------
    // Credential class
    // ------------------------------------------------------------------
    /// Re-proof of the current password failed
    #[error("Password is not correct")]
    PasswordNotCorrect,

    /// Primary credential check failed
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// An MFA one-time code did not verify
    #[error("The code is not valid")]
    MfaCodeNotValid,

    /// The enrollment code for a new authenticator app did not verify
    #[error("Failed verifying the authenticator code")]
    FailedVerifyingAuthenticatorCode,

    /// The FIDO2 engine rejected an attestation or assertion
    #[error("Device verification failed")]
    FidoVerificationFailed,

    // ------------------------------------------------------------------
    // Policy class
    // ------------------------------------------------------------------
    /// Account is disabled (or locked)
    #[error("Account is disabled")]
    AccountIsDisabled,

    /// Account has not completed verification
    #[error("Account is not verified")]
    AccountNotVerified,

    /// New password matches one of the recently used passwords
    #[error("Password was used recently")]
    PasswordInHistory,

    /// A user with this email already exists
    #[error("User already exists")]
    UserAlreadyExists,

    /// First-run setup was already completed
    #[error("The system is already set up")]
    SystemIsAlreadySetup,

    // ------------------------------------------------------------------
    // Persistence class
    // ------------------------------------------------------------------
    /// The unit-of-work save failed; overrides any domain outcome
    #[error("Error saving changes")]
    SavingChanges,

    /// Unexpected internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the [`ErrorKind`] for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::UserNotFound
            | IdentityError::DeviceNotFound
            | IdentityError::UserNotificationNotFound => ErrorKind::NotFound,

            IdentityError::UserAlreadyDisabled
            | IdentityError::UserNotDisabled
            | IdentityError::UserIsAlreadyVerified
            | IdentityError::AuthenticatorAppAlreadyEnrolled
            | IdentityError::UserAlreadyExists
            | IdentityError::SystemIsAlreadySetup => ErrorKind::Conflict,

            IdentityError::NoAuthenticatorAppEnrolled => ErrorKind::UnprocessableEntity,

            IdentityError::PasswordNotCorrect
            | IdentityError::AuthenticationFailed
            | IdentityError::MfaCodeNotValid
            | IdentityError::FailedVerifyingAuthenticatorCode
            | IdentityError::FidoVerificationFailed => ErrorKind::Unauthorized,

            IdentityError::AccountIsDisabled | IdentityError::AccountNotVerified => {
                ErrorKind::Forbidden
            }

            IdentityError::PasswordInHistory => ErrorKind::UnprocessableEntity,

            IdentityError::SavingChanges => ErrorKind::ServiceUnavailable,
            IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the workspace-wide [`AppError`]
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with the appropriate level
    pub fn log(&self) {
        match self {
            IdentityError::SavingChanges => {
                tracing::error!("Failed to save identity changes");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::AuthenticationFailed | IdentityError::PasswordNotCorrect => {
                tracing::warn!("Invalid credential attempt");
            }
            IdentityError::MfaCodeNotValid
            | IdentityError::FidoVerificationFailed
            | IdentityError::FailedVerifyingAuthenticatorCode => {
                tracing::warn!("MFA verification failed");
            }
            IdentityError::AccountIsDisabled => {
                tracing::warn!("Authentication attempt on disabled account");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        IdentityError::Internal(err.to_string())
    }
}
