//! CLI error handling and formatting.

use std::io;
use std::process::ExitCode;

use console::style;
use thiserror::Error;

use arena_common_config::{ConfigError, EnvError};
use arena_common_log::LogError;
use arena_tournament::{ArenaError, LlmError};

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Tournament {
        message: String,
        #[source]
        source: ArenaError,
        hint: Option<String>,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Backend { .. } => "E003",
            Self::Tournament { .. } => "E004",
            Self::User { .. } => "E005",
            Self::Other(_) => "E999",
        }
    }

    /// Numeric process status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Backend { .. } => 4,
            Self::Tournament { .. } => 5,
            Self::User { .. } => 1,
            Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. }
            | Self::Backend { hint, .. }
            | Self::Tournament { hint, .. }
            | Self::User { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Render `error[CODE]: message` plus an optional hint line for stderr.
    pub fn report(&self, verbose: bool) -> String {
        let label = style(format!("error[{}]:", self.code())).red().bold();
        let mut output = format!("{label} {self}");

        if verbose {
            let mut source = std::error::Error::source(self);
            while let Some(cause) = source {
                output.push_str(&format!("\n  {} {cause}", style("caused by:").dim()));
                source = std::error::Error::source(cause);
            }
        }

        if let Some(hint) = self.hint() {
            output.push_str(&format!("\n\n{} {hint}", style("hint:").cyan().bold()));
        }
        output
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check .arena/config.yaml or the file passed with --config".to_string()),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
            hint: None,
        }
    }
}

impl From<LogError> for CliError {
    fn from(err: LogError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
            hint: Some("Check ARENA_LOG_FILE".to_string()),
        }
    }
}

impl From<LlmError> for CliError {
    fn from(err: LlmError) -> Self {
        Self::Backend {
            message: format!("Generation backend error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Is Ollama running? Set OLLAMA_BASE_URL to point elsewhere".to_string()),
        }
    }
}

impl From<arena_common_core::Error> for CliError {
    fn from(err: arena_common_core::Error) -> Self {
        ArenaError::from(err).into()
    }
}

impl From<ArenaError> for CliError {
    fn from(err: ArenaError) -> Self {
        let hint = match &err {
            ArenaError::InsufficientStarters { .. } => {
                Some("Add starter-*.json persona files under data/personalities".to_string())
            }
            ArenaError::Gateway(_) => {
                Some("Is Ollama running? Set OLLAMA_BASE_URL to point elsewhere".to_string())
            }
            ArenaError::StructuredOutput(_) => {
                Some(
                    "The meta model kept producing malformed personas; \
                     try another models.meta_model"
                        .to_string(),
                )
            }
            ArenaError::InconsistentState(_) => {
                Some("Inspect or remove data/arena_state.json to start over".to_string())
            }
            _ => None,
        };
        Self::Tournament {
            message: err.to_string(),
            source: err,
            hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_starters_maps_to_tournament_error() {
        let err: CliError = ArenaError::InsufficientStarters {
            required: 5,
            found: 2,
        }
        .into();

        assert_eq!(err.code(), "E004");
        assert_eq!(err.exit_status(), 5);
        assert!(err.hint().unwrap().contains("starter-"));
        assert_eq!(err.to_string(), "Need at least 5 starter personas, found 2");
    }

    #[test]
    fn test_report_includes_code_and_hint() {
        console::set_colors_enabled(false);
        let err = CliError::user_with_hint("no questions", "pass --questions");
        let report = err.report(false);
        assert!(report.starts_with("error[E005]: no questions"));
        assert!(report.ends_with("hint: pass --questions"));
    }

    #[test]
    fn test_verbose_report_walks_source_chain() {
        console::set_colors_enabled(false);
        let err: CliError = ArenaError::Store(arena_common_core::Error::new("disk full")).into();
        let report = err.report(true);
        assert!(report.contains("caused by:"));
        assert!(report.contains("disk full"));
    }

    #[test]
    fn test_config_error_has_hint() {
        let err: CliError = ConfigError::ValidationError {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.code(), "E001");
        assert!(err.hint().is_some());
    }
}
