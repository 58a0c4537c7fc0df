// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vaultward.toml` > `~/.config/vaultward/vaultward.toml`
//! > `/etc/vaultward/vaultward.toml` with environment variable overrides via
//! the `VAULTWARD_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::VaultwardConfig;

/// Name of the config file looked up in each hierarchy level.
pub const CONFIG_FILE_NAME: &str = "vaultward.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "VAULTWARD_";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vaultward/vaultward.toml` (system-wide)
/// 3. `~/.config/vaultward/vaultward.toml` (user XDG config)
/// 4. `./vaultward.toml` (local directory)
/// 5. `VAULTWARD_*` environment variables
pub fn load_config() -> Result<VaultwardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VaultwardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultwardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VaultwardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultwardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VaultwardConfig::default()))
        .merge(Toml::file(
            Path::new("/etc/vaultward").join(CONFIG_FILE_NAME),
        ))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vaultward").join(CONFIG_FILE_NAME))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `VAULTWARD_LAYOUT_FILES_DIR` must
/// map to `layout.files_dir`, not `layout.files.dir`. `VAULTWARD_PASSPHRASE`
/// is not a config key and is ignored here.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&["passphrase"])
        .map(|key| {
            // `key` keeps the env var's case, prefix stripped.
            // Example: VAULTWARD_KDF_MEMORY_COST -> "kdf.memory_cost"
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("vault_", "vault.", 1)
                .replacen("layout_", "layout.", 1)
                .replacen("kdf_", "kdf.", 1)
                .replacen("logging_", "logging.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VAULTWARD_VAULT_ROOT", "/srv/vault");
            jail.set_env("VAULTWARD_LAYOUT_FILES_DIR", "payloads");
            jail.set_env("VAULTWARD_KDF_MEMORY_COST", "131072");
            jail.set_env("VAULTWARD_LOGGING_LEVEL", "debug");
            jail.set_env("VAULTWARD_PASSPHRASE", "not-config");

            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert_eq!(config.vault.root, "/srv/vault");
            assert_eq!(config.layout.files_dir, "payloads");
            assert_eq!(config.kdf.memory_cost, 131072);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                r#"
[vault]
root = "/from/local"

[kdf]
iterations = 5
"#,
            )?;

            let config = load_config()?;
            assert_eq!(config.vault.root, "/from/local");
            assert_eq!(config.kdf.iterations, 5);
            assert_eq!(config.kdf.parallelism, 4);
            Ok(())
        });
    }
}
