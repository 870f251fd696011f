//! Infrastructure Layer
//!
//! In-memory implementations of the persistence and capability
//! boundaries. Used for local development and as the test doubles for
//! the application layer; a durable store plugs in behind the same
//! traits.

pub mod memory;
