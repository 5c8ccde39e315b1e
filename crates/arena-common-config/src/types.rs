//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Tournament rules.
    pub tournament: TournamentConfig,
    /// Model pool configuration.
    pub models: ModelsConfig,
    /// Generation backend configuration.
    pub backend: BackendConfig,
    /// On-disk locations.
    pub paths: PathsConfig,
}

/// Fewest starter personas a tournament may be configured to bootstrap with.
pub const MIN_STARTER_COUNT: usize = 5;

/// Tournament rules and cadences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    /// Total number of rounds to run, counting rounds from resumed state.
    pub total_rounds: u32,
    /// Run the elimination phase every N rounds.
    pub elimination_interval: u32,
    /// Consecutive vote-less rounds that make a contestant eligible for elimination.
    pub drought_limit: u32,
    /// Starter personas required to bootstrap a fresh tournament, at least
    /// [`MIN_STARTER_COUNT`].
    pub starter_count: usize,
    /// Round blocks kept in the feedback digest.
    pub digest_window: usize,
    /// Corrective retries after the first invalid vote.
    pub max_vote_retries: u32,
    /// Corrective retries after malformed persona synthesis output.
    pub max_generation_retries: u32,
    /// Seed for model assignment and fallback votes.
    pub seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            total_rounds: 30,
            elimination_interval: 3,
            drought_limit: 3,
            starter_count: 5,
            digest_window: 5,
            max_vote_retries: 2,
            max_generation_retries: 2,
            seed: None,
        }
    }
}

/// Model pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Models contestants are drawn from.
    pub pool: Vec<String>,
    /// Model used to synthesize replacement personas.
    pub meta_model: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            pool: vec![
                "llama3.2:latest".to_string(),
                "gemma3:12b".to_string(),
                "qwen3:8b".to_string(),
                "mistral:7b".to_string(),
                "phi4:14b".to_string(),
            ],
            meta_model: "phi4:14b".to_string(),
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the Ollama server.
    pub ollama_base_url: String,
    /// Per-request timeout in seconds. `0` disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// On-disk locations, relative paths resolve against the project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Personas, tournament state and feedback digest.
    pub data_dir: PathBuf,
    /// Per-round logs.
    pub logs_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl PathsConfig {
    pub fn personalities_dir(&self) -> PathBuf {
        self.data_dir.join("personalities")
    }

    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("arena_state.json")
    }

    pub fn feedback_file(&self) -> PathBuf {
        self.data_dir.join("feedback.md")
    }

    /// Resolve relative paths against `base`.
    pub fn resolved(&self, base: &std::path::Path) -> Self {
        let resolve = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            data_dir: resolve(&self.data_dir),
            logs_dir: resolve(&self.logs_dir),
        }
    }
}

impl ArenaConfig {
    /// Apply `OLLAMA_BASE_URL` and `ARENA_DATA_DIR` overrides from the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = crate::env::Environment::get(crate::env::vars::OLLAMA_BASE_URL) {
            self.backend.ollama_base_url = url;
        }
        if let Some(dir) = crate::env::Environment::get(crate::env::vars::ARENA_DATA_DIR) {
            self.paths.data_dir = PathBuf::from(dir);
        }
    }
}
