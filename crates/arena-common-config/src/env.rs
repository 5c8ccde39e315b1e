//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Backend
    pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";

    // Configuration
    pub const ARENA_CONFIG: &str = "ARENA_CONFIG";
    pub const ARENA_DATA_DIR: &str = "ARENA_DATA_DIR";

    // Logging
    pub const ARENA_LOG_LEVEL: &str = "ARENA_LOG_LEVEL";
    pub const ARENA_LOG_FORMAT: &str = "ARENA_LOG_FORMAT";
    pub const ARENA_LOG_FILE: &str = "ARENA_LOG_FILE";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from `.env` then `.env.local` (later overrides earlier).
    /// Missing files are fine; unreadable or malformed ones are errors.
    pub fn init() -> Result<Self, EnvError> {
        load_optional(dotenvy::from_filename(".env"))?;
        load_optional(dotenvy::from_filename_override(".env.local"))?;
        Ok(Self { _guard: () })
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

fn load_optional<T>(result: dotenvy::Result<T>) -> Result<(), EnvError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variable_is_none() {
        assert_eq!(Environment::get("ARENA_NONEXISTENT_VAR_12345"), None);
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        env::set_var("ARENA_TEST_EMPTY", "  ");
        assert_eq!(Environment::get("ARENA_TEST_EMPTY"), None);
        env::remove_var("ARENA_TEST_EMPTY");
    }

    #[test]
    fn test_value_is_returned_untrimmed() {
        env::set_var("ARENA_TEST_VALUE", "http://gpu-box:11434");
        assert_eq!(
            Environment::get("ARENA_TEST_VALUE").as_deref(),
            Some("http://gpu-box:11434")
        );
        env::remove_var("ARENA_TEST_VALUE");
    }

    #[test]
    fn test_missing_env_files_are_not_errors() {
        let missing = dotenvy::from_filename("/nonexistent/arena/.env");
        assert!(load_optional(missing).is_ok());
    }

    #[test]
    fn test_environment_init_without_files() {
        assert!(Environment::init().is_ok());
    }
}
