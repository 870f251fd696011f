//! Value Object Module

pub mod authentication_state;
pub mod email;
pub mod ids;
pub mod mfa_provider;
pub mod person_name;
pub mod security_stamp;
pub mod totp_secret;
pub mod user_password;
