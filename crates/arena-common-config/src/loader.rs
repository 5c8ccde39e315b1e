//! Configuration file loading and parsing.

use crate::types::{ArenaConfig, MIN_STARTER_COUNT};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding the project configuration.
pub const CONFIG_DIR: &str = ".arena";
/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error(
        "invalid YAML at line {}: {message}",
        line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string())
    )]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Project directory this loader resolves against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the project configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from `.arena/config.yaml`, falling back to defaults.
    pub fn load(&self) -> Result<ArenaConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            let config = ArenaConfig::default();
            self.validate(&config)?;
            return Ok(config);
        }

        self.parse_file(&config_path)
    }

    /// Load an explicit configuration file. The file must exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ArenaConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        self.parse_file(path)
    }

    fn parse_file(&self, path: &Path) -> Result<ArenaConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        let config: ArenaConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_RE.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    pub fn validate(&self, config: &ArenaConfig) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::ValidationError {
                message: message.to_string(),
            })
        };

        let t = &config.tournament;
        if t.total_rounds == 0 {
            return invalid("tournament.total_rounds must be greater than 0");
        }
        if t.elimination_interval == 0 {
            return invalid("tournament.elimination_interval must be greater than 0");
        }
        if t.drought_limit == 0 {
            return invalid("tournament.drought_limit must be greater than 0");
        }
        if t.starter_count < MIN_STARTER_COUNT {
            return invalid(
                format!("tournament.starter_count must be at least {MIN_STARTER_COUNT}").as_str(),
            );
        }
        if t.digest_window == 0 {
            return invalid("tournament.digest_window must be greater than 0");
        }

        if config.models.pool.iter().all(|m| m.trim().is_empty()) {
            return invalid("models.pool must contain at least one model");
        }
        if config.models.meta_model.trim().is_empty() {
            return invalid("models.meta_model must not be empty");
        }

        Ok(())
    }

    /// Save configuration to `.arena/config.yaml`.
    pub fn save(&self, config: &ArenaConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
