//! File system utilities for the arena stores.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arena_common_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: u64) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::NotFound => format!("file not found: {}", path.display()),
            io::ErrorKind::PermissionDenied => format!("permission denied: {}", path.display()),
            _ => format!("failed to read metadata: {}", path.display()),
        };
        Error::file_system(message, path, Some(e))
    })?;

    if metadata.len() > max_size {
        return Err(Error::file_system(
            format!("file too large: {} bytes (max: {})", metadata.len(), max_size),
            path,
            None,
        ));
    }

    fs::read_to_string(path).map_err(|e| {
        Error::file_system(format!("failed to read file: {}", path.display()), path, Some(e))
    })
}

/// Read a file to string, treating a missing file as `None`.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::file_system(
            format!("failed to read file: {}", path.display()),
            path,
            Some(e),
        )),
    }
}

/// Read and deserialize a JSON file, treating a missing file as `None`.
pub fn read_json_optional<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Option<T>> {
    let path = path.as_ref();
    let Some(contents) = read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_str(&contents).map(Some).map_err(|e| {
        Error::Serialization(format!("invalid JSON in {}: {}", path.display(), e))
    })
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::file_system(
                format!("failed to create temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;

        file.write_all(contents).map_err(|e| {
            Error::file_system(
                format!("failed to write to temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;

        file.sync_all().map_err(|e| {
            Error::file_system(
                format!("failed to sync temporary file: {}", temp_path.display()),
                &temp_path,
                Some(e),
            )
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::file_system(
            format!("failed to rename temporary file to target: {}", path.display()),
            path,
            Some(e),
        )
    })
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_string_atomic(path, &json)
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            Error::file_system(
                format!("failed to create directory: {}", path.display()),
                path,
                Some(e),
            )
        })?;
    }
    Ok(())
}

/// List files with the given extension, sorted by path. A missing directory
/// yields an empty list.
pub fn list_files_with_extension(dir: impl AsRef<Path>, ext: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let read_dir = fs::read_dir(dir).map_err(|e| {
        Error::file_system(format!("failed to read directory: {}", dir.display()), dir, Some(e))
    })?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| {
            Error::file_system(
                format!("failed to read directory entry: {}", dir.display()),
                dir,
                Some(e),
            )
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
