// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vaultward migration engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Vaultward configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultwardConfig {
    /// Location of the vault directory.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Names of the artifacts inside the vault directory.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Argon2id parameters for every passphrase-derived key.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VaultwardConfig {
    /// Resolve a layout entry against the vault root.
    ///
    /// Absolute entries are returned unchanged.
    pub fn resolve(&self, entry: &str) -> PathBuf {
        let entry = Path::new(entry);
        if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            Path::new(&self.vault.root).join(entry)
        }
    }
}

/// Vault location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Root directory of the vault.
    #[serde(default = "default_vault_root")]
    pub root: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: default_vault_root(),
        }
    }
}

fn default_vault_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("vaultward"))
        .unwrap_or_else(|| PathBuf::from("vault"))
        .to_string_lossy()
        .into_owned()
}

/// Artifact names, relative to `vault.root` unless absolute.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Legacy plaintext credential list (master, decoy, panic).
    #[serde(default = "default_passwords_file")]
    pub passwords_file: String,

    /// Directory holding file payloads.
    #[serde(default = "default_files_dir")]
    pub files_dir: String,

    /// Legacy plaintext metadata catalog.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// SQLite database backing the secure credential store.
    #[serde(default = "default_credential_db")]
    pub credential_db: String,

    /// Encrypted metadata catalog.
    #[serde(default = "default_encrypted_catalog")]
    pub encrypted_catalog: String,

    /// Directory that receives pre-migration backups.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            passwords_file: default_passwords_file(),
            files_dir: default_files_dir(),
            metadata_file: default_metadata_file(),
            credential_db: default_credential_db(),
            encrypted_catalog: default_encrypted_catalog(),
            backup_dir: default_backup_dir(),
        }
    }
}

impl LayoutConfig {
    /// `(key, value)` pairs for every layout entry, used by validation.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("passwords_file", self.passwords_file.as_str()),
            ("files_dir", self.files_dir.as_str()),
            ("metadata_file", self.metadata_file.as_str()),
            ("credential_db", self.credential_db.as_str()),
            ("encrypted_catalog", self.encrypted_catalog.as_str()),
            ("backup_dir", self.backup_dir.as_str()),
        ]
    }
}

fn default_passwords_file() -> String {
    "passwords.txt".to_string()
}

fn default_files_dir() -> String {
    "files".to_string()
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_credential_db() -> String {
    "credentials.db".to_string()
}

fn default_encrypted_catalog() -> String {
    "metadata.enc".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

/// Argon2id key derivation configuration.
///
/// Defaults follow OWASP recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_kdf_memory_cost(),
            iterations: default_kdf_iterations(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level for the `vaultward` crates when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
