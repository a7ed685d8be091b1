//! Error types for the knocker-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for knocker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or knocking.
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No key file was given and the key variable is unset or empty.
    #[error("Encryption key not found: no key file given and {var} is not set")]
    KeyNotFound { var: String },

    /// Envelope payload is not valid base64.
    #[error("Failed to decode envelope: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Decoded envelope is shorter than the nonce.
    #[error("Envelope too short: {len} bytes, nonce needs {nonce_len}")]
    ShortInput { len: usize, nonce_len: usize },

    /// Authentication tag did not verify (tampered data or wrong key).
    #[error("Failed to decrypt envelope: authentication failed")]
    Authentication,

    /// Sealing a plaintext failed.
    #[error("Failed to encrypt: {0}")]
    Encryption(String),

    /// Input handed to the decrypt utility has no envelope marker.
    #[error("Input is not encrypted (missing ENCRYPTED: prefix)")]
    NotEncrypted,

    /// Structurally invalid configuration.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Duration literal could not be parsed.
    #[error("Invalid delay '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Inline target clause is malformed.
    #[error("Malformed target '{clause}': {reason}")]
    MalformedTarget { clause: String, reason: String },

    /// Protocol other than tcp or udp.
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Gateway could not be resolved to a local bind address.
    #[error("Failed to resolve gateway address {gateway}: {source}")]
    Gateway {
        gateway: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection to the remote endpoint could not be established.
    #[error("Failed to connect to {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection was established but the knock could not be written.
    #[error("Failed to send packet to {addr}: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// First fatal failure of a knock run, tagged with the offending target.
    #[error("Knocking target {host} failed: {source}")]
    Knock {
        host: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True for the envelope failures collectively reported as "decryption failed".
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            Error::Decode(_) | Error::ShortInput { .. } | Error::Authentication
        )
    }

    /// True for failures caused by the configuration rather than the remote
    /// side. These abort a run even when the target does not wait for a
    /// connection.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Error::Gateway { .. } | Error::UnsupportedProtocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(Error::Authentication.is_decryption_failure());
        assert!(Error::ShortInput { len: 3, nonce_len: 12 }.is_decryption_failure());
        assert!(!Error::Parse("x".into()).is_decryption_failure());

        assert!(Error::UnsupportedProtocol("icmp".into()).is_misconfiguration());
        let dial = Error::Dial {
            addr: "127.0.0.1:1".into(),
            source: std::io::ErrorKind::ConnectionRefused.into(),
        };
        assert!(!dial.is_misconfiguration());
    }

    #[test]
    fn test_knock_error_names_host() {
        let err = Error::Knock {
            host: "10.0.0.1".into(),
            source: Box::new(Error::Dial {
                addr: "10.0.0.1:7000".into(),
                source: std::io::ErrorKind::TimedOut.into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.0.0.1"));
        assert!(msg.contains("7000"));
    }
}
