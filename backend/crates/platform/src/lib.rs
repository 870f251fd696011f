//! Platform crate - infrastructure-free cryptographic building blocks
//!
//! Capabilities consumed by the domain crates:
//! - `password`: adaptive password hashing and policy validation

pub mod password;
