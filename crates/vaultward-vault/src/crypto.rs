// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use vaultward_core::VaultwardError;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Length of the random nonce generated by [`seal`].
pub const NONCE_LEN: usize = 12;

fn cipher(key: &[u8; 32]) -> Result<LessSafeKey, VaultwardError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultwardError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// `aad` is authenticated but not encrypted; the same bytes must be passed to
/// [`open`]. Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    key: &[u8; 32],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), VaultwardError> {
    let cipher = cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| VaultwardError::Crypto("failed to generate random nonce".to_string()))?;

    // Seal in place: plaintext buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| VaultwardError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext produced by [`seal`].
///
/// Fails if the key is wrong, the data was tampered with, or `aad` differs
/// from the value used when sealing.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, VaultwardError> {
    let cipher = cipher(key)?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = cipher
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce_bytes),
            Aad::from(aad),
            &mut in_out,
        )
        .map_err(|_| {
            VaultwardError::Crypto(
                "AES-256-GCM decryption failed -- wrong key or corrupted data".to_string(),
            )
        })?;

    Ok(plaintext.to_vec())
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; 32], VaultwardError> {
    let mut key = [0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| VaultwardError::Crypto("failed to generate random key".to_string()))?;
    Ok(key)
}
