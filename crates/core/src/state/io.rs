//! # IO Utilities
//!
//! File system operations for the `.promptlab` runtime directory
//! (database file, config file, exports).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Get the runtime directory path (.promptlab)
pub fn get_runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var("PROMPTLAB_RUNTIME_PATH") {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".promptlab")
}

/// Ensure the runtime directory exists
pub async fn ensure_runtime_dir() -> Result<PathBuf> {
    let path = get_runtime_path();
    fs::create_dir_all(&path)
        .await
        .with_context(|| format!("Failed to create runtime directory: {:?}", path))?;
    Ok(path)
}

/// Read a file relative to `root`, `None` if it does not exist
pub async fn read_optional(root: &Path, relative_path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = root.join(relative_path.as_ref());
    if fs::metadata(&path).await.is_err() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(Some(content))
}

/// Write a file relative to `root`, creating parent directories
pub async fn write_file(root: &Path, relative_path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
    let path = root.join(relative_path.as_ref());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write file: {:?}", path))?;
    Ok(path)
}
