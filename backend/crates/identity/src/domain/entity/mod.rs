//! Domain Entities
//!
//! `User` is the only aggregate root. Child entities expose narrow
//! mutators and are only ever modified through aggregate methods.

pub mod authenticator_app;
pub mod authenticator_device;
pub mod login_attempt;
pub mod password_history;
pub mod security_token;
pub mod user;
pub mod user_notification;
