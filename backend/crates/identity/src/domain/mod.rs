//! Domain Layer
//!
//! The User aggregate, its value objects, the capability traits the core
//! consumes (clock, FIDO2 engine, session context, event dispatcher), and
//! the repository boundary.

pub mod actor;
pub mod clock;
pub mod entity;
pub mod event;
pub mod fido;
pub mod repository;
pub mod value_object;

// Re-exports
pub use actor::{CurrentActor, CurrentSession};
pub use clock::{Clock, SystemClock};
pub use entity::user::User;
pub use event::{DomainEvent, EventDispatcher};
pub use fido::Fido2Engine;
pub use repository::{SaveResult, UserRepository};
