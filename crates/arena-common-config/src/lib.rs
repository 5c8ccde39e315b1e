//! Configuration types for the debate arena.
//!
//! This crate provides the configuration used for `.arena/config.yaml`
//! files: tournament rules, the model pool, the generation backend and
//! on-disk locations.

pub mod env;
pub mod loader;
pub mod types;


pub use env::*;
pub use loader::*;
pub use types::*;
