// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM secure stores for the Vaultward migration engine.
//!
//! Provides the concrete collaborators the engine migrates into:
//! - [`SqliteCredentialStore`]: credentials under a passphrase-wrapped master key.
//! - [`EnvelopeFileEncryptor`]: per-file Argon2id + AES-256-GCM envelopes.
//! - [`EncryptedCatalogStore`]: the file metadata catalog in a single envelope.

pub mod catalog;
pub mod credentials;
pub mod crypto;
pub mod envelope;
pub mod files;
pub mod kdf;
pub mod prompt;
pub mod wipe;

pub use catalog::EncryptedCatalogStore;
pub use credentials::SqliteCredentialStore;
pub use files::{EnvelopeFileEncryptor, encrypted_path};
pub use prompt::{PASSPHRASE_ENV_VAR, get_passphrase, get_passphrase_with_confirm};
