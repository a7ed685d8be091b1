//! Decrypt command - open an encrypted configuration file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use knocker_core::{envelope, KeySource};

pub async fn run(input: &Path, output: &Path, key_file: Option<PathBuf>) -> Result<()> {
    let raw = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    if !envelope::is_envelope(&raw) {
        bail!("{} is not encrypted (missing ENCRYPTED: prefix)", input.display());
    }

    let key = KeySource::from_key_file(key_file)
        .derive_key()
        .await
        .context("Failed to obtain encryption key")?;

    let plaintext = envelope::open(&raw, &key)
        .with_context(|| format!("Failed to decrypt {}", input.display()))?;
    super::write_private(output, &plaintext).await?;

    println!("Decrypted {} -> {}", input.display(), output.display());
    Ok(())
}
