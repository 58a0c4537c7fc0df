// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborators for deterministic testing.
//!
//! The in-memory stores remember the passphrase they were first keyed with and
//! reject any other, mirroring the real stores' wrong-passphrase behaviour.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use vaultward_core::{
    CredentialRole, CredentialStore, FileEncryptor, FileRecord, MetadataStore, VaultwardError,
};

fn wrong_passphrase() -> VaultwardError {
    VaultwardError::Crypto("invalid passphrase".to_string())
}

/// Credential store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<MemoryCredentials>,
}

#[derive(Debug, Default)]
struct MemoryCredentials {
    passphrase: Option<String>,
    entries: HashMap<CredentialRole, String>,
}

impl MemoryCredentialStore {
    /// Plaintext value stored under `role`.
    pub fn get(&self, role: CredentialRole) -> Option<String> {
        self.inner.lock().unwrap().entries.get(&role).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().entries.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn store(
        &self,
        role: CredentialRole,
        credential: &SecretString,
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        let mut inner = self.inner.lock().unwrap();
        let key = inner
            .passphrase
            .get_or_insert_with(|| passphrase.expose_secret().to_string());
        if key.as_str() != passphrase.expose_secret() {
            return Err(wrong_passphrase());
        }
        inner
            .entries
            .insert(role, credential.expose_secret().to_string());
        Ok(())
    }

    async fn retrieve(
        &self,
        role: CredentialRole,
        passphrase: &SecretString,
    ) -> Result<Option<SecretString>, VaultwardError> {
        let inner = self.inner.lock().unwrap();
        match &inner.passphrase {
            None => Ok(None),
            Some(key) if key != passphrase.expose_secret() => Err(wrong_passphrase()),
            Some(_) => Ok(inner
                .entries
                .get(&role)
                .map(|value| SecretString::from(value.clone()))),
        }
    }
}

/// Credential store whose writes always fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCredentialStore;

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn store(
        &self,
        _role: CredentialRole,
        _credential: &SecretString,
        _passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        Err(VaultwardError::Crypto(
            "injected credential store failure".to_string(),
        ))
    }

    async fn retrieve(
        &self,
        _role: CredentialRole,
        _passphrase: &SecretString,
    ) -> Result<Option<SecretString>, VaultwardError> {
        Ok(None)
    }
}

/// Metadata store that keeps the catalog in memory.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    catalog: Mutex<Option<(String, Vec<FileRecord>)>>,
}

impl MemoryMetadataStore {
    pub fn records(&self) -> Option<Vec<FileRecord>> {
        self.catalog
            .lock()
            .unwrap()
            .as_ref()
            .map(|(_, records)| records.clone())
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn write_catalog(
        &self,
        records: &[FileRecord],
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        *self.catalog.lock().unwrap() =
            Some((passphrase.expose_secret().to_string(), records.to_vec()));
        Ok(())
    }

    async fn read_catalog(
        &self,
        passphrase: &SecretString,
    ) -> Result<Option<Vec<FileRecord>>, VaultwardError> {
        match self.catalog.lock().unwrap().as_ref() {
            None => Ok(None),
            Some((key, _)) if key != passphrase.expose_secret() => Err(wrong_passphrase()),
            Some((_, records)) => Ok(Some(records.clone())),
        }
    }

    fn has_catalog(&self) -> bool {
        self.catalog.lock().unwrap().is_some()
    }
}

/// Wraps a real encryptor and fails every file with a given name.
pub struct RejectingFileEncryptor<F> {
    inner: F,
    reject: String,
    rejected: Mutex<Vec<PathBuf>>,
}

impl<F: FileEncryptor> RejectingFileEncryptor<F> {
    pub fn new(inner: F, reject: impl Into<String>) -> Self {
        Self {
            inner,
            reject: reject.into(),
            rejected: Mutex::new(Vec::new()),
        }
    }

    /// Paths that were refused so far.
    pub fn rejected(&self) -> Vec<PathBuf> {
        self.rejected.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F: FileEncryptor> FileEncryptor for RejectingFileEncryptor<F> {
    async fn encrypt(
        &self,
        path: &Path,
        passphrase: &SecretString,
    ) -> Result<PathBuf, VaultwardError> {
        if path.file_name().is_some_and(|name| name == self.reject.as_str()) {
            self.rejected.lock().unwrap().push(path.to_path_buf());
            return Err(VaultwardError::Crypto(format!(
                "injected encryption failure for {}",
                path.display()
            )));
        }
        self.inner.encrypt(path, passphrase).await
    }

    fn is_encrypted(&self, path: &Path) -> Result<bool, VaultwardError> {
        self.inner.is_encrypted(path)
    }
}

/// Wraps a real encryptor and cannot inspect files with a given name.
pub struct UnreadableFileEncryptor<F> {
    inner: F,
    unreadable: String,
}

impl<F: FileEncryptor> UnreadableFileEncryptor<F> {
    pub fn new(inner: F, unreadable: impl Into<String>) -> Self {
        Self {
            inner,
            unreadable: unreadable.into(),
        }
    }
}

#[async_trait]
impl<F: FileEncryptor> FileEncryptor for UnreadableFileEncryptor<F> {
    async fn encrypt(
        &self,
        path: &Path,
        passphrase: &SecretString,
    ) -> Result<PathBuf, VaultwardError> {
        self.inner.encrypt(path, passphrase).await
    }

    fn is_encrypted(&self, path: &Path) -> Result<bool, VaultwardError> {
        if path.file_name().is_some_and(|name| name == self.unreadable.as_str()) {
            return Err(VaultwardError::io(
                "open",
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        self.inner.is_encrypted(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn memory_credentials_enforce_first_passphrase() {
        let store = MemoryCredentialStore::default();
        store
            .store(CredentialRole::Master, &secret("m"), &secret("p1"))
            .await
            .unwrap();
        assert!(
            store
                .store(CredentialRole::Decoy, &secret("d"), &secret("p2"))
                .await
                .is_err()
        );
        assert!(store.retrieve(CredentialRole::Master, &secret("p2")).await.is_err());
        assert_eq!(store.get(CredentialRole::Master).as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn memory_catalog_round_trips() {
        let store = MemoryMetadataStore::default();
        assert!(!store.has_catalog());
        let records = vec![FileRecord {
            file_name: "a".to_string(),
            original_name: None,
            size_bytes: 1,
            content_type: None,
            uploaded_at: None,
        }];
        store.write_catalog(&records, &secret("p")).await.unwrap();
        assert_eq!(store.read_catalog(&secret("p")).await.unwrap(), Some(records));
        assert!(store.read_catalog(&secret("q")).await.is_err());
    }
}
