// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, distinct artifact locations, and KDF minimums.

use std::collections::HashMap;

use crate::diagnostic::ConfigError;
use crate::model::VaultwardConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VaultwardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.root.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.root must not be empty".to_string(),
        });
    }

    // Every artifact needs its own location.
    let mut seen: HashMap<std::path::PathBuf, &str> = HashMap::new();
    for (key, value) in config.layout.entries() {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("layout.{key} must not be empty"),
            });
            continue;
        }
        let resolved = config.resolve(value);
        if let Some(other) = seen.insert(resolved, key) {
            errors.push(ConfigError::Validation {
                message: format!("layout.{key} and layout.{other} resolve to the same path"),
            });
        }
    }

    // Backups inside the file directory would be scanned as legacy files.
    if !config.layout.files_dir.trim().is_empty() && !config.layout.backup_dir.trim().is_empty() {
        let files_dir = config.resolve(&config.layout.files_dir);
        let backup_dir = config.resolve(&config.layout.backup_dir);
        if backup_dir != files_dir && backup_dir.starts_with(&files_dir) {
            errors.push(ConfigError::Validation {
                message: "layout.backup_dir must not be inside layout.files_dir".to_string(),
            });
        }
    }

    if config.kdf.memory_cost < 32768 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.memory_cost must be at least 32768 (32 MiB), got {}",
                config.kdf.memory_cost
            ),
        });
    }

    if config.kdf.iterations < 2 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.iterations must be at least 2, got {}",
                config.kdf.iterations
            ),
        });
    }

    if config.kdf.parallelism < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.parallelism must be at least 1, got {}",
                config.kdf.parallelism
            ),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = VaultwardConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_root_fails_validation() {
        let mut config = VaultwardConfig::default();
        config.vault.root = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "vault.root"));
    }

    #[test]
    fn duplicate_layout_entries_fail_validation() {
        let mut config = VaultwardConfig::default();
        config.layout.encrypted_catalog = config.layout.metadata_file.clone();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "resolve to the same path"));
    }

    #[test]
    fn backup_dir_inside_files_dir_fails_validation() {
        let mut config = VaultwardConfig::default();
        config.layout.backup_dir = "files/backups".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "backup_dir must not be inside"));
    }

    #[test]
    fn weak_kdf_collects_every_error() {
        let mut config = VaultwardConfig::default();
        config.kdf.memory_cost = 1024;
        config.kdf.iterations = 1;
        config.kdf.parallelism = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = VaultwardConfig::default();
        config.logging.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "logging.level"));
    }

    #[test]
    fn absolute_layout_entries_are_checked_for_collisions() {
        let toml_str = r#"
[vault]
root = "/srv/vault"

[layout]
credential_db = "/srv/vault/metadata.enc"
"#;
        let config: VaultwardConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "layout.encrypted_catalog and layout.credential_db"));
    }

    #[test]
    fn hardened_kdf_from_toml_validates() {
        let toml_str = r#"
[kdf]
memory_cost = 262144
iterations = 4
parallelism = 2
"#;
        let config: VaultwardConfig = toml::from_str(toml_str).unwrap();
        assert!(validate_config(&config).is_ok());
    }
}
