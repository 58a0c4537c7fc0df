// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only inspection of a vault for legacy plaintext artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use vaultward_core::{Domain, FileEncryptor, VaultwardError};

use crate::layout::VaultLayout;

/// Which domains still hold plaintext data.
///
/// Fields are private so `needs_any_migration` always agrees with the
/// three per-domain flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationAssessment {
    needs_password_migration: bool,
    needs_file_migration: bool,
    needs_metadata_migration: bool,
    needs_any_migration: bool,
}

impl MigrationAssessment {
    pub fn new(passwords: bool, files: bool, metadata: bool) -> Self {
        Self {
            needs_password_migration: passwords,
            needs_file_migration: files,
            needs_metadata_migration: metadata,
            needs_any_migration: passwords || files || metadata,
        }
    }

    pub fn needs_password_migration(&self) -> bool {
        self.needs_password_migration
    }

    pub fn needs_file_migration(&self) -> bool {
        self.needs_file_migration
    }

    pub fn needs_metadata_migration(&self) -> bool {
        self.needs_metadata_migration
    }

    pub fn needs_any_migration(&self) -> bool {
        self.needs_any_migration
    }

    pub fn needs(&self, domain: Domain) -> bool {
        match domain {
            Domain::Passwords => self.needs_password_migration,
            Domain::Files => self.needs_file_migration,
            Domain::Metadata => self.needs_metadata_migration,
        }
    }

    /// Domains needing migration, in migration order.
    pub fn pending(&self) -> Vec<Domain> {
        Domain::ALL
            .into_iter()
            .filter(|domain| self.needs(*domain))
            .collect()
    }
}

/// Stateless scanner over a [`VaultLayout`].
#[derive(Clone)]
pub struct LegacyScanner {
    layout: VaultLayout,
    encryptor: Arc<dyn FileEncryptor>,
}

impl LegacyScanner {
    pub fn new(layout: VaultLayout, encryptor: Arc<dyn FileEncryptor>) -> Self {
        Self { layout, encryptor }
    }

    /// Inspect the vault as it is right now.
    ///
    /// Never fails: an artifact that exists but cannot be read is reported as
    /// needing migration, and the real error surfaces from the migrator.
    pub fn assess(&self) -> MigrationAssessment {
        let assessment = MigrationAssessment::new(
            password_file_needs_migration(&self.layout.passwords_file),
            self.files_need_migration(),
            self.layout.metadata_file.is_file(),
        );
        debug!(?assessment, root = %self.layout.root.display(), "vault assessed");
        assessment
    }

    fn files_need_migration(&self) -> bool {
        if !self.layout.files_dir.is_dir() {
            return false;
        }
        match walk_files(&self.layout.files_dir) {
            Ok(files) => files
                .iter()
                .any(|path| !matches!(self.encryptor.is_encrypted(path), Ok(true))),
            Err(e) => {
                warn!(error = %e, "file storage directory could not be listed");
                true
            }
        }
    }
}

fn password_file_needs_migration(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match fs::read(path) {
        Ok(bytes) => bytes.iter().any(|b| !b.is_ascii_whitespace()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "password file could not be read");
            true
        }
    }
}

/// Regular files under `dir`, recursively, in sorted order.
///
/// Symlinks are skipped rather than followed.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, VaultwardError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| VaultwardError::io("list", &current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| VaultwardError::io("list", &current, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| VaultwardError::io("stat", &entry.path(), e))?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;
    use vaultward_config::KdfConfig;
    use vaultward_vault::EnvelopeFileEncryptor;

    fn scanner(root: &Path) -> LegacyScanner {
        LegacyScanner::new(
            VaultLayout::under(root),
            Arc::new(EnvelopeFileEncryptor::new(KdfConfig::default())),
        )
    }

    #[test]
    fn empty_vault_needs_nothing() {
        let dir = tempdir().unwrap();
        let assessment = scanner(dir.path()).assess();
        assert!(!assessment.needs_any_migration());
        assert!(assessment.pending().is_empty());
    }

    #[test]
    fn missing_root_needs_nothing() {
        let dir = tempdir().unwrap();
        let assessment = scanner(&dir.path().join("not-created")).assess();
        assert!(!assessment.needs_any_migration());
    }

    #[test]
    fn whitespace_password_file_is_not_pending() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("passwords.txt"), " \n\r\n\t").unwrap();
        assert!(!scanner(dir.path()).assess().needs_password_migration());

        fs::write(dir.path().join("passwords.txt"), "m\nd\np\n").unwrap();
        assert!(scanner(dir.path()).assess().needs_password_migration());
    }

    #[test]
    fn unparseable_metadata_still_needs_migration() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("metadata.json"), "{ not json").unwrap();
        let assessment = scanner(dir.path()).assess();
        assert!(assessment.needs_metadata_migration());
        assert_eq!(assessment.pending(), vec![Domain::Metadata]);
    }

    #[test]
    fn only_plaintext_files_count() {
        let dir = tempdir().unwrap();
        let files = dir.path().join("files");
        fs::create_dir_all(files.join("nested")).unwrap();
        fs::write(files.join("nested/done.enc"), b"VWENC\x01 rest of envelope").unwrap();
        assert!(!scanner(dir.path()).assess().needs_file_migration());

        fs::write(files.join("nested/todo.txt"), b"plain").unwrap();
        assert!(scanner(dir.path()).assess().needs_file_migration());
    }

    #[test]
    fn empty_files_dir_needs_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("files/sub")).unwrap();
        assert!(!scanner(dir.path()).assess().needs_file_migration());
    }

    #[test]
    fn walk_files_is_sorted_and_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("c.txt"), b"").unwrap();
        fs::write(dir.path().join("b/a.txt"), b"").unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();

        let found = walk_files(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("a.txt"),
                dir.path().join("b/a.txt"),
                dir.path().join("c.txt"),
            ]
        );
    }

    proptest! {
        #[test]
        fn needs_any_is_the_disjunction(p: bool, f: bool, m: bool) {
            let assessment = MigrationAssessment::new(p, f, m);
            prop_assert_eq!(assessment.needs_any_migration(), p || f || m);
            prop_assert_eq!(assessment.pending().len(), [p, f, m].iter().filter(|x| **x).count());
        }
    }
}
