// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! Derives a 32-byte key using Argon2id (Version::V0x13) with the cost
//! parameters from [`KdfConfig`].

use ring::rand::{SecureRandom, SystemRandom};
use vaultward_config::KdfConfig;
use vaultward_core::VaultwardError;
use zeroize::Zeroizing;

/// Length of the random salt fed to Argon2id.
pub const SALT_LEN: usize = 16;

/// Derive a 32-byte key from `passphrase` using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfConfig,
) -> Result<Zeroizing<[u8; 32]>, VaultwardError> {
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| VaultwardError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| VaultwardError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], VaultwardError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| VaultwardError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
