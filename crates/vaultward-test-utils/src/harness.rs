// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end migration testing.
//!
//! `TestHarness` materialises a vault in a temp directory, optionally seeded
//! with legacy plaintext artifacts, and wires a `MigrationOrchestrator` with
//! the production collaborators, a low-cost KDF, and an in-memory audit sink.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::SecretString;
use vaultward_config::{KdfConfig, VaultwardConfig};
use vaultward_core::VaultwardError;
use vaultward_migrate::{Collaborators, MemoryAuditSink, MigrationOrchestrator, VaultLayout};

/// Argon2id parameters cheap enough for tests.
pub const FAST_KDF: KdfConfig = KdfConfig {
    memory_cost: 1024,
    iterations: 1,
    parallelism: 1,
};

/// Passphrase used by [`TestHarness::passphrase`].
pub const TEST_PASSPHRASE: &str = "correct horse battery staple";

/// Builder for creating test vaults with configurable legacy content.
pub struct TestHarnessBuilder {
    passwords: Option<String>,
    files: Vec<(String, Vec<u8>)>,
    metadata: Option<String>,
    collaborators: Option<Box<dyn FnOnce(&VaultLayout) -> Collaborators>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            passwords: None,
            files: Vec::new(),
            metadata: None,
            collaborators: None,
        }
    }

    /// Seed a complete, valid legacy vault: passwords, two files, and a
    /// catalog describing them.
    pub fn with_legacy_vault(self) -> Self {
        self.with_passwords("master-secret\ndecoy-secret\npanic-secret\n")
            .with_file("report.pdf", b"%PDF-1.7 quarterly numbers")
            .with_file("photos/beach.jpg", b"\xff\xd8\xff\xe0 jpeg")
            .with_metadata(
                r#"[
  {"file_name": "report.pdf", "size_bytes": 26, "content_type": "application/pdf"},
  {"file_name": "photos/beach.jpg", "original_name": "IMG_0042.jpg", "size_bytes": 9}
]"#,
            )
    }

    /// Contents of the legacy password file.
    pub fn with_passwords(mut self, text: &str) -> Self {
        self.passwords = Some(text.to_string());
        self
    }

    /// A payload under the file storage directory (`relative` may contain `/`).
    pub fn with_file(mut self, relative: &str, content: &[u8]) -> Self {
        self.files.push((relative.to_string(), content.to_vec()));
        self
    }

    /// Contents of the legacy metadata catalog.
    pub fn with_metadata(mut self, json: &str) -> Self {
        self.metadata = Some(json.to_string());
        self
    }

    /// Replace the production collaborators, e.g. with failure-injecting mocks.
    pub fn with_collaborators(
        mut self,
        build: impl FnOnce(&VaultLayout) -> Collaborators + 'static,
    ) -> Self {
        self.collaborators = Some(Box::new(build));
        self
    }

    /// Build the harness, writing every seeded artifact to disk.
    pub fn build(self) -> Result<TestHarness, VaultwardError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| VaultwardError::io("create", Path::new("temp dir"), e))?;

        let mut config = VaultwardConfig::default();
        config.vault.root = temp_dir.path().to_string_lossy().into_owned();
        config.kdf = FAST_KDF;
        let layout = VaultLayout::from_config(&config);

        if let Some(text) = &self.passwords {
            write(&layout.passwords_file, text.as_bytes())?;
        }
        for (relative, content) in &self.files {
            write(&layout.files_dir.join(relative), content)?;
        }
        if let Some(json) = &self.metadata {
            write(&layout.metadata_file, json.as_bytes())?;
        }

        let collaborators = match self.collaborators {
            Some(build) => build(&layout),
            None => Collaborators::for_vault(&layout, &config),
        };
        let audit = Arc::new(MemoryAuditSink::new());
        let orchestrator = MigrationOrchestrator::new(layout.clone(), collaborators, audit.clone());

        Ok(TestHarness {
            config,
            layout,
            orchestrator,
            audit,
            _temp_dir: temp_dir,
        })
    }
}

fn write(path: &Path, content: &[u8]) -> Result<(), VaultwardError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VaultwardError::io("create", parent, e))?;
    }
    fs::write(path, content).map_err(|e| VaultwardError::io("write", path, e))
}

/// A temp vault plus the orchestrator that migrates it.
pub struct TestHarness {
    /// Configuration pointing at the temp vault, with [`FAST_KDF`].
    pub config: VaultwardConfig,
    pub layout: VaultLayout,
    pub orchestrator: MigrationOrchestrator,
    /// Every audit event the orchestrator emitted.
    pub audit: Arc<MemoryAuditSink>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn passphrase(&self) -> SecretString {
        SecretString::from(TEST_PASSPHRASE.to_string())
    }

    /// Contents of every file in the vault outside the backup directory,
    /// keyed by path relative to the root.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut snapshot = BTreeMap::new();
        let mut pending = vec![self.layout.root.clone()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path == self.layout.backup_dir {
                    continue;
                }
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(content) = fs::read(&path) {
                    let relative = path
                        .strip_prefix(&self.layout.root)
                        .unwrap_or(&path)
                        .to_path_buf();
                    snapshot.insert(relative, content);
                }
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_vault_is_seeded_on_disk() {
        let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
        let snapshot = harness.snapshot();
        let names: Vec<_> = snapshot.keys().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(
            names,
            vec![
                "files/photos/beach.jpg",
                "files/report.pdf",
                "metadata.json",
                "passwords.txt",
            ]
        );
        assert!(harness.orchestrator.assess().needs_any_migration());
    }

    #[test]
    fn empty_harness_has_empty_vault() {
        let harness = TestHarness::builder().build().unwrap();
        assert!(harness.snapshot().is_empty());
        assert!(!harness.orchestrator.assess().needs_any_migration());
    }
}
