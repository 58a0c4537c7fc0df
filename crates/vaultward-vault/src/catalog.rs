// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted metadata catalog: the JSON record list sealed in one envelope.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;
use vaultward_config::KdfConfig;
use vaultward_core::{FileRecord, MetadataStore, VaultwardError};
use zeroize::Zeroizing;

use crate::envelope;
use crate::wipe;

#[derive(Debug, Clone)]
pub struct EncryptedCatalogStore {
    path: PathBuf,
    kdf: KdfConfig,
}

impl EncryptedCatalogStore {
    pub fn new(path: impl Into<PathBuf>, kdf: KdfConfig) -> Self {
        Self {
            path: path.into(),
            kdf,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetadataStore for EncryptedCatalogStore {
    async fn write_catalog(
        &self,
        records: &[FileRecord],
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        let json = Zeroizing::new(
            serde_json::to_vec(records)
                .map_err(|e| VaultwardError::Internal(format!("failed to encode catalog: {e}")))?,
        );
        let sealed = envelope::seal(passphrase, &json, &self.kdf)?;
        wipe::write_atomic(&self.path, &sealed)?;
        debug!(path = %self.path.display(), records = records.len(), "catalog written");
        Ok(())
    }

    async fn read_catalog(
        &self,
        passphrase: &SecretString,
    ) -> Result<Option<Vec<FileRecord>>, VaultwardError> {
        let sealed = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VaultwardError::io("read", &self.path, e)),
        };
        let json = envelope::open(passphrase, &sealed)?;
        let records = serde_json::from_slice(&json)
            .map_err(|e| VaultwardError::parse("encrypted catalog", e.to_string()))?;
        Ok(Some(records))
    }

    fn has_catalog(&self) -> bool {
        self.path.is_file()
    }
}
