//! Encrypt command - seal a plaintext configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use knocker_core::{envelope, KeySource};

pub async fn run(input: &Path, output: &Path, key_file: Option<PathBuf>) -> Result<()> {
    let plaintext = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    let key = KeySource::from_key_file(key_file)
        .derive_key()
        .await
        .context("Failed to obtain encryption key")?;

    let sealed = envelope::seal(&plaintext, &key)?;
    super::write_private(output, &sealed).await?;

    println!("Encrypted {} -> {}", input.display(), output.display());
    Ok(())
}
