//! Common test utilities for CLI testing.

use std::path::Path;

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

use arena_test_utils::{temp_dir, write_json};

/// A throwaway project directory.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: temp_dir(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `count` starter persona files.
    pub fn with_starters(self, count: usize) -> Self {
        for n in 1..=count {
            self.write_persona(json!({
                "id": format!("starter-{n:02}"),
                "name": format!("Starter {n}"),
                "persona": format!("Starter {n} speaks plainly."),
                "voting_criteria": "Rewards clear answers.",
                "generation": 1,
                "parent_id": null,
                "born_round": 0,
                "died_round": null,
            }));
        }
        self
    }

    pub fn write_persona(&self, persona: Value) {
        let id = persona["id"].as_str().expect("persona id").to_string();
        write_json(self.path(), &format!("data/personalities/{id}.json"), &persona);
    }

    pub fn write_state(&self, state: Value) {
        write_json(self.path(), "data/arena_state.json", &state);
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }

    /// `arena` bound to this project, with env overrides cleared.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("arena").expect("Binary not found");
        cmd.current_dir(self.path())
            .arg("--project-dir")
            .arg(self.path())
            .env_remove("ARENA_CONFIG")
            .env_remove("ARENA_DATA_DIR")
            .env_remove("ARENA_LOG_LEVEL")
            .env_remove("RUST_LOG")
            // nothing listens here; tests never reach the gateway
            .env("OLLAMA_BASE_URL", "http://127.0.0.1:9")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A contestant entry for a hand-written state file.
pub fn contestant(n: usize, votes: u32, drought: u32) -> Value {
    json!({
        "id": format!("starter-{n:02}"),
        "name": format!("Starter {n}"),
        "model": "mistral:7b",
        "traits": "t",
        "voting_criteria": "c",
        "generation": 1,
        "total_votes_received": votes,
        "drought": drought,
        "rounds_participated": 4,
    })
}
