// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-migration snapshots of each domain, and restoring from them.
//!
//! A backup is a directory `backups/<domain>-<UTC timestamp>-<id>/` holding
//! a copy of every artifact the domain owns plus `manifest.json`. The
//! manifest is written last, so a backup interrupted half-way never verifies.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use vaultward_core::{Domain, VaultwardError};

use crate::layout::VaultLayout;
use crate::scanner::walk_files;

/// Name of the manifest inside each backup directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Domain to backup-directory mapping produced by a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupRecord {
    entries: BTreeMap<Domain, PathBuf>,
}

impl BackupRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, domain: Domain, path: PathBuf) {
        self.entries.insert(domain, path);
    }

    pub fn get(&self, domain: Domain) -> Option<&Path> {
        self.entries.get(&domain).map(PathBuf::as_path)
    }

    /// Entries in migration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Domain, &Path)> {
        self.entries.iter().map(|(domain, path)| (*domain, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the record as JSON so rollback can run from another process.
    pub fn save(&self, path: &Path) -> Result<(), VaultwardError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| VaultwardError::Internal(format!("failed to encode backup record: {e}")))?;
        vaultward_vault::wipe::write_atomic(path, &json)
    }

    pub fn load(path: &Path) -> Result<Self, VaultwardError> {
        let bytes = fs::read(path).map_err(|e| VaultwardError::io("read", path, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| VaultwardError::parse(path.display().to_string(), e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Nothing existed at the live path when the backup was taken.
    Missing,
    File,
    Dir,
}

/// One backed-up artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Layout key; also the name of the copy inside the backup directory.
    pub key: String,
    /// Live location the artifact is restored to.
    pub source: PathBuf,
    pub kind: ArtifactKind,
    /// SHA-256 of every copied file, keyed by `/`-separated path relative to
    /// the backup directory.
    #[serde(default)]
    pub digests: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub domain: Domain,
    pub created_at: DateTime<Utc>,
    pub artifacts: Vec<ManifestEntry>,
}

/// Creates, verifies, restores, and discards domain backups.
#[derive(Debug, Clone)]
pub struct BackupManager {
    layout: VaultLayout,
}

impl BackupManager {
    pub fn new(layout: VaultLayout) -> Self {
        Self { layout }
    }

    /// Copy the current state of `domain` into a fresh backup directory.
    ///
    /// On failure the partial backup directory is removed and nothing in the
    /// vault has been touched.
    pub fn backup(&self, domain: Domain) -> Result<PathBuf, VaultwardError> {
        let root = &self.layout.backup_dir;
        fs::create_dir_all(root).map_err(|e| VaultwardError::io("create", root, e))?;

        let created_at = Utc::now();
        let id = uuid::Uuid::new_v4().simple().to_string();
        let dir = root.join(format!(
            "{domain}-{}-{}",
            created_at.format("%Y%m%dT%H%M%S%.3fZ"),
            &id[..8]
        ));
        fs::create_dir(&dir).map_err(|e| VaultwardError::io("create", &dir, e))?;

        match self.snapshot(domain, created_at, &dir) {
            Ok(manifest) => {
                info!(
                    domain = %domain,
                    path = %dir.display(),
                    artifacts = manifest.artifacts.len(),
                    "backup created"
                );
                Ok(dir)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&dir) {
                    warn!(path = %dir.display(), error = %cleanup, "partial backup left behind");
                }
                Err(e)
            }
        }
    }

    fn snapshot(
        &self,
        domain: Domain,
        created_at: DateTime<Utc>,
        dir: &Path,
    ) -> Result<BackupManifest, VaultwardError> {
        let mut artifacts = Vec::new();
        for artifact in self.layout.artifacts(domain) {
            let copy = dir.join(artifact.key);
            let kind = kind_of(&artifact.path)?;
            match kind {
                ArtifactKind::Missing => {}
                ArtifactKind::File => copy_file(&artifact.path, &copy)?,
                ArtifactKind::Dir => copy_dir(&artifact.path, &copy)?,
            }
            let digests = if kind == ArtifactKind::Missing {
                BTreeMap::new()
            } else {
                digest_tree(dir, &copy)?
            };
            artifacts.push(ManifestEntry {
                key: artifact.key.to_string(),
                source: artifact.path,
                kind,
                digests,
            });
        }

        let manifest = BackupManifest {
            domain,
            created_at,
            artifacts,
        };
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| VaultwardError::Internal(format!("failed to encode manifest: {e}")))?;
        vaultward_vault::wipe::write_atomic(&dir.join(MANIFEST_FILE), &json)?;
        Ok(manifest)
    }

    /// Check every copied file against the manifest digests.
    pub fn verify(&self, path: &Path) -> Result<BackupManifest, VaultwardError> {
        let manifest_path = path.join(MANIFEST_FILE);
        let bytes = fs::read(&manifest_path)
            .map_err(|e| VaultwardError::io("read", &manifest_path, e))?;
        let manifest: BackupManifest = serde_json::from_slice(&bytes)
            .map_err(|e| VaultwardError::parse("backup manifest", e.to_string()))?;

        for entry in &manifest.artifacts {
            let copy = path.join(&entry.key);
            match entry.kind {
                ArtifactKind::Missing => continue,
                ArtifactKind::File if !copy.is_file() => {
                    return Err(VaultwardError::Backup(format!(
                        "{} is missing from backup {}",
                        entry.key,
                        path.display()
                    )));
                }
                ArtifactKind::Dir if !copy.is_dir() => {
                    return Err(VaultwardError::Backup(format!(
                        "{} is missing from backup {}",
                        entry.key,
                        path.display()
                    )));
                }
                _ => {}
            }
            let actual = digest_tree(path, &copy)?;
            if actual != entry.digests {
                return Err(VaultwardError::Backup(format!(
                    "checksum mismatch for {} in backup {}",
                    entry.key,
                    path.display()
                )));
            }
        }
        Ok(manifest)
    }

    /// Replace the live artifacts of `domain` with the copies in `path`.
    ///
    /// Artifacts that did not exist at backup time are deleted.
    pub fn restore(&self, domain: Domain, path: &Path) -> Result<(), VaultwardError> {
        let manifest = self.verify(path)?;
        if manifest.domain != domain {
            return Err(VaultwardError::Backup(format!(
                "backup {} belongs to {}, not {domain}",
                path.display(),
                manifest.domain
            )));
        }

        for entry in &manifest.artifacts {
            remove_live(&entry.source)?;
            let copy = path.join(&entry.key);
            match entry.kind {
                ArtifactKind::Missing => {}
                ArtifactKind::File => copy_file(&copy, &entry.source)?,
                ArtifactKind::Dir => copy_dir(&copy, &entry.source)?,
            }
            debug!(domain = %domain, artifact = %entry.key, kind = ?entry.kind, "artifact restored");
        }

        info!(domain = %domain, path = %path.display(), "backup restored");
        Ok(())
    }

    /// Delete every backup directory named in `record`. Returns how many
    /// were removed; already-missing directories are skipped.
    pub fn discard(&self, record: &BackupRecord) -> Result<usize, VaultwardError> {
        let mut removed = 0;
        for (domain, path) in record.iter() {
            if !path.join(MANIFEST_FILE).is_file() {
                warn!(domain = %domain, path = %path.display(), "not a backup directory, skipping");
                continue;
            }
            fs::remove_dir_all(path).map_err(|e| VaultwardError::io("remove", path, e))?;
            info!(domain = %domain, path = %path.display(), "backup discarded");
            removed += 1;
        }
        Ok(removed)
    }
}

fn kind_of(path: &Path) -> Result<ArtifactKind, VaultwardError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(ArtifactKind::Dir),
        Ok(meta) if meta.is_file() => Ok(ArtifactKind::File),
        Ok(_) => Err(VaultwardError::Backup(format!(
            "{} is neither a regular file nor a directory",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ArtifactKind::Missing),
        Err(e) => Err(VaultwardError::io("stat", path, e)),
    }
}

fn remove_live(path: &Path) -> Result<(), VaultwardError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path).map_err(|e| VaultwardError::io("remove", path, e))
        }
        Ok(_) => fs::remove_file(path).map_err(|e| VaultwardError::io("remove", path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VaultwardError::io("stat", path, e)),
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), VaultwardError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| VaultwardError::io("create", parent, e))?;
    }
    fs::copy(from, to).map_err(|e| VaultwardError::io("copy", from, e))?;
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> Result<(), VaultwardError> {
    fs::create_dir_all(to).map_err(|e| VaultwardError::io("create", to, e))?;
    let entries = fs::read_dir(from).map_err(|e| VaultwardError::io("list", from, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| VaultwardError::io("list", from, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| VaultwardError::io("stat", &entry.path(), e))?;
        let target = to.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else if file_type.is_file() {
            copy_file(&entry.path(), &target)?;
        }
    }
    Ok(())
}

/// SHA-256 of `path` (a file, or every file under a directory), keyed
/// relative to `base`.
fn digest_tree(base: &Path, path: &Path) -> Result<BTreeMap<String, String>, VaultwardError> {
    let files = if path.is_dir() {
        walk_files(path)?
    } else {
        vec![path.to_path_buf()]
    };
    let mut digests = BTreeMap::new();
    for file in files {
        let relative = file
            .strip_prefix(base)
            .map_err(|_| VaultwardError::Internal(format!("{} escaped backup", file.display())))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        digests.insert(relative, sha256_file(&file)?);
    }
    Ok(digests)
}

fn sha256_file(path: &Path) -> Result<String, VaultwardError> {
    let mut file = fs::File::open(path).map_err(|e| VaultwardError::io("open", path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| VaultwardError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
