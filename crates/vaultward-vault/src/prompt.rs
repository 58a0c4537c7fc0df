// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the VAULTWARD_PASSPHRASE environment variable.

use secrecy::SecretString;
use vaultward_core::VaultwardError;

/// The environment variable name for providing the vault passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "VAULTWARD_PASSPHRASE";

fn from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

fn read_line(prompt: &str) -> Result<String, VaultwardError> {
    eprint!("{prompt}");
    rpassword::read_password()
        .map_err(|e| VaultwardError::InvalidInput(format!("failed to read passphrase: {e}")))
}

fn not_available() -> VaultwardError {
    VaultwardError::InvalidInput(format!(
        "no passphrase provided. Set {PASSPHRASE_ENV_VAR} or run interactively."
    ))
}

/// Get the vault passphrase from the environment or an interactive TTY prompt.
///
/// Priority:
/// 1. `VAULTWARD_PASSPHRASE` (for scripted and headless runs)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, VaultwardError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let passphrase = read_line("Vault passphrase: ")?;
        if passphrase.is_empty() {
            return Err(VaultwardError::InvalidInput(
                "empty passphrase not allowed".to_string(),
            ));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(not_available())
}

/// Get the vault passphrase, prompting twice when interactive.
///
/// Used before a migration, where a mistyped passphrase would lock the
/// migrated data behind an unknown key. The environment variable is taken
/// as-is.
pub fn get_passphrase_with_confirm() -> Result<SecretString, VaultwardError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = read_line("New vault passphrase: ")?;
        let second = read_line("Confirm vault passphrase: ")?;
        if first != second {
            return Err(VaultwardError::InvalidInput(
                "passphrases do not match".to_string(),
            ));
        }
        if first.is_empty() {
            return Err(VaultwardError::InvalidInput(
                "empty passphrase not allowed".to_string(),
            ));
        }
        return Ok(SecretString::from(first));
    }

    Err(not_available())
}
