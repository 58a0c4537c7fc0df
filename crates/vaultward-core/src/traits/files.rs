// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File payload encryption.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::VaultwardError;

/// Encrypts plaintext file payloads in place inside the vault.
#[async_trait]
pub trait FileEncryptor: Send + Sync {
    /// Encrypt the file at `path` with `passphrase`, remove the plaintext
    /// original, and return the path of the encrypted replacement.
    async fn encrypt(
        &self,
        path: &Path,
        passphrase: &SecretString,
    ) -> Result<PathBuf, VaultwardError>;

    /// Whether the file at `path` is already in encrypted form.
    ///
    /// Read-only; used by the scanner and the status reporter.
    fn is_encrypted(&self, path: &Path) -> Result<bool, VaultwardError>;
}
