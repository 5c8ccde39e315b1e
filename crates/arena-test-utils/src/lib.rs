//! Test utilities for the arena crates.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("test_file");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Writes `value` as pretty JSON to `dir/relative`, creating parent directories.
pub fn write_json(dir: &Path, relative: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    let json = serde_json::to_string_pretty(value).expect("Failed to serialize JSON");
    std::fs::write(&path, json).expect("Failed to write JSON file");
    path
}

/// Reads and parses a JSON file.
pub fn read_json(path: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&contents).expect("Failed to parse JSON file")
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_write_then_read_json() {
        let dir = temp_dir();
        let value = serde_json::json!({"id": "starter-1", "generation": 0});
        let path = write_json(dir.path(), "personalities/starter-1.json", &value);
        assert_eq!(read_json(&path), value);
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u32, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);
        let err: Result<u32, String> = Err("boom".into());
        assert_eq!(assert_err!(err), "boom");
    }

    proptest! {
        #[test]
        fn test_temp_file_content_roundtrip(content in "\\PC*") {
            let (_dir, path) = temp_file(&content);
            let read_content = std::fs::read_to_string(&path).unwrap();
            prop_assert_eq!(content, read_content);
        }
    }
}
