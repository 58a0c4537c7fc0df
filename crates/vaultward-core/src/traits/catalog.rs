// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted metadata catalog storage.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::VaultwardError;
use crate::types::FileRecord;

/// Persists the file-descriptor catalog in encrypted form.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Replace the encrypted catalog with `records`, keyed by `passphrase`.
    async fn write_catalog(
        &self,
        records: &[FileRecord],
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError>;

    /// Decrypt and return the catalog, or `None` if none has been written.
    async fn read_catalog(
        &self,
        passphrase: &SecretString,
    ) -> Result<Option<Vec<FileRecord>>, VaultwardError>;

    /// Whether an encrypted catalog exists on disk.
    fn has_catalog(&self) -> bool;
}
