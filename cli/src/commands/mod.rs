//! CLI command implementations.

pub mod decrypt;
pub mod encrypt;
pub mod knock;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;

/// Pick `-i` if given, otherwise fall back to the global `--config`.
pub fn input_path(input: Option<PathBuf>, config: Option<PathBuf>) -> Result<PathBuf> {
    match input.or(config) {
        Some(path) => Ok(path),
        None => bail!("an input file is required: use -i or --config"),
    }
}

/// Write a file readable only by its owner.
pub async fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.sync_all().await?;
    Ok(())
}
