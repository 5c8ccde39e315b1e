//! Arena CLI Library
//!
//! Argument parsing, commands and console output for the `arena` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod questions;

pub use error::CliError;
