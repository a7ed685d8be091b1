//! Encrypted configuration envelope.
//!
//! An envelope is the ASCII marker `ENCRYPTED:` followed by base64 text of
//! `nonce || ciphertext || tag`, sealed with AES-256-GCM and no associated
//! data. Keys are derived from an arbitrary secret with a single SHA-256
//! pass, so any passphrase or key file maps to a 256-bit key.
//!
//! # Nonce invariant
//! Every call to [`encrypt`] draws a fresh 96-bit nonce from the OS RNG.
//! A nonce must never be reused under the same key; there is no counter or
//! caller-supplied nonce anywhere in this module.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Marker that prefixes every encrypted configuration file.
pub const MARKER: &[u8] = b"ENCRYPTED:";

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// A derived 256-bit key.
pub type EnvelopeKey = [u8; 32];

/// Derive a key from raw secret bytes (SHA-256, no salt).
pub fn derive_key(secret: &[u8]) -> EnvelopeKey {
    Sha256::digest(secret).into()
}

/// Seal `plaintext` and return the base64 envelope text (without marker).
pub fn encrypt(plaintext: &[u8], key: &EnvelopeKey) -> Result<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| Error::Encryption(format!("failed to generate nonce: {}", e)))?;

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| Error::Encryption("AES-GCM seal failed".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(STANDARD.encode(out))
}

/// Open base64 envelope text (without marker).
///
/// Line breaks anywhere in the text are ignored, so wrapped envelopes open.
/// Tampered data, a wrong key and truncation all surface as
/// [`Error::Authentication`]; no partial plaintext is ever returned.
pub fn decrypt(envelope: &[u8], key: &EnvelopeKey) -> Result<Vec<u8>> {
    let text: Vec<u8> = envelope
        .trim_ascii_end()
        .iter()
        .copied()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();
    let data = STANDARD.decode(text)?;

    if data.len() < NONCE_LEN {
        return Err(Error::ShortInput {
            len: data.len(),
            nonce_len: NONCE_LEN,
        });
    }
    let (nonce, sealed) = data.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| Error::Authentication)
}

/// True iff `raw` starts with the envelope marker.
pub fn is_envelope(raw: &[u8]) -> bool {
    raw.starts_with(MARKER)
}

/// Encrypt a whole file body, returning marker-prefixed bytes.
pub fn seal(plaintext: &[u8], key: &EnvelopeKey) -> Result<Vec<u8>> {
    let text = encrypt(plaintext, key)?;
    let mut out = Vec::with_capacity(MARKER.len() + text.len());
    out.extend_from_slice(MARKER);
    out.extend_from_slice(text.as_bytes());
    Ok(out)
}

/// Decrypt marker-prefixed bytes. Input without the marker is rejected.
pub fn open(raw: &[u8], key: &EnvelopeKey) -> Result<Vec<u8>> {
    let body = raw.strip_prefix(MARKER).ok_or(Error::NotEncrypted)?;
    decrypt(body, key)
}
