// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Re-emits the plaintext metadata catalog through the encrypted store.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::info;
use vaultward_core::{Domain, FileRecord, MetadataStore, VaultwardError};

use super::{DomainMigrator, DomainOutcome};

pub struct MetadataMigrator {
    source: PathBuf,
    store: Arc<dyn MetadataStore>,
}

impl MetadataMigrator {
    pub fn new(source: impl Into<PathBuf>, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            source: source.into(),
            store,
        }
    }

    async fn run(&self, passphrase: &SecretString) -> Result<usize, VaultwardError> {
        let bytes = fs::read(&self.source).map_err(|e| VaultwardError::io("read", &self.source, e))?;
        let records: Vec<FileRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| VaultwardError::parse("metadata catalog", e.to_string()))?;

        self.store.write_catalog(&records, passphrase).await?;
        if self.store.read_catalog(passphrase).await?.as_ref() != Some(&records) {
            return Err(VaultwardError::Crypto(
                "encrypted catalog did not read back intact".to_string(),
            ));
        }

        vaultward_vault::wipe::scrub_and_remove(&self.source)?;
        info!(path = %self.source.display(), records = records.len(), "plaintext catalog removed");
        Ok(records.len())
    }
}

#[async_trait]
impl DomainMigrator for MetadataMigrator {
    fn domain(&self) -> Domain {
        Domain::Metadata
    }

    async fn migrate(&self, passphrase: &SecretString) -> DomainOutcome {
        match self.run(passphrase).await {
            Ok(count) => {
                DomainOutcome::succeeded(Domain::Metadata, &format!("{count} record(s) encrypted"))
            }
            Err(e) => DomainOutcome::failed(Domain::Metadata, &e),
        }
    }

    fn describe_status(&self) -> String {
        match (self.source.is_file(), self.store.has_catalog()) {
            (true, _) => "plaintext metadata catalog present".to_string(),
            (false, true) => "encrypted metadata catalog in place".to_string(),
            (false, false) => "no metadata catalog".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vaultward_test_utils::mocks::MemoryMetadataStore;

    fn pass() -> SecretString {
        SecretString::from("p".to_string())
    }

    #[tokio::test]
    async fn migrates_catalog_and_removes_plaintext() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("metadata.json");
        fs::write(
            &source,
            r#"[{"file_name":"a.pdf","size_bytes":12},{"file_name":"b.png","size_bytes":3,"content_type":"image/png"}]"#,
        )
        .unwrap();
        let store = Arc::new(MemoryMetadataStore::default());
        let migrator = MetadataMigrator::new(&source, store.clone());
        assert_eq!(migrator.describe_status(), "plaintext metadata catalog present");

        let outcome = migrator.migrate(&pass()).await;

        assert!(outcome.success, "{:?}", outcome.log);
        assert_eq!(
            outcome.log,
            vec!["Metadata Migration: succeeded (2 record(s) encrypted)"]
        );
        assert!(!source.exists());
        assert_eq!(store.records().unwrap()[1].file_name, "b.png");
        assert_eq!(migrator.describe_status(), "encrypted metadata catalog in place");
    }

    #[tokio::test]
    async fn unparseable_catalog_is_a_parse_failure() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("metadata.json");
        fs::write(&source, "{ this is not a catalog").unwrap();
        let store = Arc::new(MemoryMetadataStore::default());

        let outcome = MetadataMigrator::new(&source, store.clone())
            .migrate(&pass())
            .await;

        assert!(!outcome.success);
        assert!(
            outcome.log[0].starts_with("Metadata Migration: failed [parse]"),
            "{:?}",
            outcome.log
        );
        assert!(source.exists());
        assert!(store.records().is_none());
    }

    #[test]
    fn status_without_any_catalog() {
        let dir = tempdir().unwrap();
        let migrator = MetadataMigrator::new(
            dir.path().join("metadata.json"),
            Arc::new(MemoryMetadataStore::default()),
        );
        assert_eq!(migrator.describe_status(), "no metadata catalog");
    }
}
