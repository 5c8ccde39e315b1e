//! Arena common core types and utilities.

pub mod error;
pub mod id;
pub mod timestamp;

pub use error::{Error, Result};
pub use id::{IdParseError, PersonaId, PersonaKind};
pub use timestamp::Timestamp;
