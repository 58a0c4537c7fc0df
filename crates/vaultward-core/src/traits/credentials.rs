// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure credential storage.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::VaultwardError;
use crate::types::CredentialRole;

/// Encrypted storage for the vault's master, decoy, and panic credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Durably store `credential` under `role`, protected by `passphrase`.
    ///
    /// Returns [`VaultwardError::Crypto`] if the store is already keyed by a
    /// different passphrase.
    async fn store(
        &self,
        role: CredentialRole,
        credential: &SecretString,
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError>;

    /// Read back the credential stored under `role`, if any.
    async fn retrieve(
        &self,
        role: CredentialRole,
        passphrase: &SecretString,
    ) -> Result<Option<SecretString>, VaultwardError>;
}
