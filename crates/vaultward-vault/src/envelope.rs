// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-describing passphrase envelope used for file payloads and the catalog.
//!
//! Layout:
//!
//! ```text
//! "VWENC" | version (1) | memory_cost u32 LE | iterations u32 LE | parallelism u32 LE
//!         | salt (16) | nonce (12) | AES-256-GCM ciphertext + tag
//! ```
//!
//! Everything before the nonce is the header; it is bound to the ciphertext
//! as associated data, so tampering with the KDF parameters fails decryption.

use secrecy::{ExposeSecret, SecretString};
use vaultward_config::KdfConfig;
use vaultward_core::VaultwardError;
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::kdf::{self, SALT_LEN};

/// Magic bytes at the start of every envelope.
pub const MAGIC: &[u8; 5] = b"VWENC";

/// Current envelope format version.
pub const VERSION: u8 = 1;

/// Number of leading bytes that identify an envelope.
pub const MARKER_LEN: usize = MAGIC.len() + 1;

const HEADER_LEN: usize = MARKER_LEN + 12 + SALT_LEN;

/// Refuse to derive keys with more than 4 GiB of Argon2 memory when opening.
const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Whether `bytes` begins with the envelope magic and a supported version.
pub fn is_sealed(bytes: &[u8]) -> bool {
    bytes.len() >= MARKER_LEN && &bytes[..MAGIC.len()] == MAGIC && bytes[MAGIC.len()] == VERSION
}

/// Encrypt `plaintext` under a key derived from `passphrase`.
pub fn seal(
    passphrase: &SecretString,
    plaintext: &[u8],
    params: &KdfConfig,
) -> Result<Vec<u8>, VaultwardError> {
    let salt = kdf::generate_salt()?;

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(MAGIC);
    header.push(VERSION);
    header.extend_from_slice(&params.memory_cost.to_le_bytes());
    header.extend_from_slice(&params.iterations.to_le_bytes());
    header.extend_from_slice(&params.parallelism.to_le_bytes());
    header.extend_from_slice(&salt);

    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, params)?;
    let (ciphertext, nonce) = crypto::seal(&key, plaintext, &header)?;

    let mut sealed = header;
    sealed.reserve(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt an envelope produced by [`seal`].
///
/// A wrong passphrase and a corrupted envelope are indistinguishable and both
/// surface as [`VaultwardError::Crypto`].
pub fn open(
    passphrase: &SecretString,
    sealed: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultwardError> {
    if !is_sealed(sealed) {
        return Err(VaultwardError::Crypto(
            "not an encrypted envelope (missing VWENC header)".to_string(),
        ));
    }
    if sealed.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(VaultwardError::Crypto("truncated envelope".to_string()));
    }

    let (header, body) = sealed.split_at(HEADER_LEN);
    let params = KdfConfig {
        memory_cost: read_u32(header, MARKER_LEN),
        iterations: read_u32(header, MARKER_LEN + 4),
        parallelism: read_u32(header, MARKER_LEN + 8),
    };
    if params.memory_cost > MAX_MEMORY_COST {
        return Err(VaultwardError::Crypto(format!(
            "envelope requests {} KiB of KDF memory, refusing",
            params.memory_cost
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&header[MARKER_LEN + 12..]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&body[..NONCE_LEN]);

    let key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &params)?;
    let plaintext = crypto::open(&key, &nonce, &body[NONCE_LEN..], header).map_err(|_| {
        VaultwardError::Crypto("wrong passphrase or corrupted envelope".to_string())
    })?;
    Ok(Zeroizing::new(plaintext))
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}
