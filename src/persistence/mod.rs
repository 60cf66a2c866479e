//! JSON save/load for settings and the score table
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! crash mid-write never leaves a truncated file behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and parse a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a JSON file, falling back to `T::default()` when missing or corrupt
pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path) {
        Ok(value) => {
            log::info!("Loaded {}", path.display());
            value
        }
        Err(PersistError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("No file at {}, using defaults", path.display());
            T::default()
        }
        Err(e) => {
            log::warn!("Failed to load {}: {e}; using defaults", path.display());
            T::default()
        }
    }
}

/// Pretty-print `value` to `path`, creating parent directories as needed
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
