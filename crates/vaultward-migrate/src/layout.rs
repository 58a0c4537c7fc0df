// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolved on-disk locations of every vault artifact.

use std::path::{Path, PathBuf};

use vaultward_config::VaultwardConfig;
use vaultward_config::model::LayoutConfig;
use vaultward_core::Domain;

/// Absolute (or root-relative) paths for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    pub root: PathBuf,
    pub passwords_file: PathBuf,
    pub files_dir: PathBuf,
    pub metadata_file: PathBuf,
    pub credential_db: PathBuf,
    pub encrypted_catalog: PathBuf,
    pub backup_dir: PathBuf,
}

/// One artifact that belongs to a domain's backup set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Stable layout key, used as the name of the copy inside a backup.
    pub key: &'static str,
    pub path: PathBuf,
}

impl VaultLayout {
    pub fn from_config(config: &VaultwardConfig) -> Self {
        let layout = &config.layout;
        Self {
            root: PathBuf::from(&config.vault.root),
            passwords_file: config.resolve(&layout.passwords_file),
            files_dir: config.resolve(&layout.files_dir),
            metadata_file: config.resolve(&layout.metadata_file),
            credential_db: config.resolve(&layout.credential_db),
            encrypted_catalog: config.resolve(&layout.encrypted_catalog),
            backup_dir: config.resolve(&layout.backup_dir),
        }
    }

    /// The default layout rooted at `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let config = VaultwardConfig {
            vault: vaultward_config::model::VaultConfig {
                root: root.as_ref().to_string_lossy().into_owned(),
            },
            layout: LayoutConfig::default(),
            ..VaultwardConfig::default()
        };
        Self::from_config(&config)
    }

    /// Artifacts a migration of `domain` may touch, in backup order.
    ///
    /// Each domain owns both its legacy and its secure representation, so a
    /// restore removes whatever the migration created.
    pub fn artifacts(&self, domain: Domain) -> Vec<Artifact> {
        let pair = |key, path: &PathBuf| Artifact {
            key,
            path: path.clone(),
        };
        match domain {
            Domain::Passwords => vec![
                pair("passwords_file", &self.passwords_file),
                pair("credential_db", &self.credential_db),
            ],
            Domain::Files => vec![pair("files_dir", &self.files_dir)],
            Domain::Metadata => vec![
                pair("metadata_file", &self.metadata_file),
                pair("encrypted_catalog", &self.encrypted_catalog),
            ],
        }
    }
}
