// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vaultward migration engine.

use std::path::Path;

use strum::Display;
use thiserror::Error;

/// The primary error type used across the collaborators and the migration engine.
#[derive(Debug, Error)]
pub enum VaultwardError {
    /// Configuration errors (invalid TOML, missing required fields, bad paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was rejected before anything was touched.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A legacy artifact could not be parsed.
    #[error("failed to parse {artifact}: {message}")]
    Parse { artifact: String, message: String },

    /// Filesystem read/write failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Credential database errors (connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Encryption, decryption, or key derivation failure (including wrong passphrase).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Backup creation, verification, or restore failure.
    #[error("backup error: {0}")]
    Backup(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`VaultwardError`], used in migration logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorClass {
    Input,
    Parse,
    Io,
    Crypto,
    Internal,
}

impl VaultwardError {
    /// Build an [`VaultwardError::Io`] describing the operation and path involved.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("failed to {action} {}", path.display()),
            source,
        }
    }

    /// Build a [`VaultwardError::Parse`] for the named artifact.
    pub fn parse(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Which bucket of the error taxonomy this error falls into.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidInput(_) => ErrorClass::Input,
            Self::Config(_) => ErrorClass::Input,
            Self::Parse { .. } => ErrorClass::Parse,
            Self::Io { .. } | Self::Storage { .. } | Self::Backup(_) => ErrorClass::Io,
            Self::Crypto(_) => ErrorClass::Crypto,
            Self::Internal(_) => ErrorClass::Internal,
        }
    }
}
