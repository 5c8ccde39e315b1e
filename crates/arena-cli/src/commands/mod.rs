//! Command implementations.

pub mod personas;
pub mod run;
pub mod status;

pub use personas::PersonasCommand;
pub use run::RunCommand;
pub use status::{StatusCommand, SummaryReport};
