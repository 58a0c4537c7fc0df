// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed secure credential store.
//!
//! Uses a key-wrapping pattern:
//! - A random master key encrypts every credential (stored in `credentials`).
//! - The master key is encrypted with a key derived from the vault passphrase
//!   via Argon2id (stored in `vault_meta` as `wrapped_master_key`).
//!
//! Each credential row is sealed with its role name as associated data, so a
//! row copied under another role fails to decrypt.
//!
//! The database uses the default rollback journal and every operation closes
//! its connection, leaving a single self-contained file that can be backed up
//! by copying.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::params;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use vaultward_config::KdfConfig;
use vaultward_core::{CredentialRole, CredentialStore, VaultwardError};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vault_meta (
    key   TEXT PRIMARY KEY,
    value BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS credentials (
    role       TEXT PRIMARY KEY,
    ciphertext BLOB NOT NULL,
    nonce      BLOB NOT NULL,
    stored_at  TEXT NOT NULL
);
";

/// Credential store persisted in a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    path: PathBuf,
    kdf: KdfConfig,
}

impl SqliteCredentialStore {
    /// Create a store backed by the database at `path`.
    ///
    /// Nothing is opened until the first operation. `kdf` governs the
    /// wrapping key when the store is first created; an existing store keeps
    /// the parameters recorded in its `vault_meta`.
    pub fn new(path: impl Into<PathBuf>, kdf: KdfConfig) -> Self {
        Self {
            path: path.into(),
            kdf,
        }
    }

    /// Path of the backing database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Roles that currently hold a credential, without decrypting anything.
    pub async fn stored_roles(&self) -> Result<Vec<CredentialRole>, VaultwardError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let conn = self.open().await?;
        let names = conn
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT role FROM credentials")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err);
        close(conn).await?;

        let mut roles: Vec<CredentialRole> = names?
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        roles.sort_by_key(|role| CredentialRole::ORDERED.iter().position(|r| r == role));
        Ok(roles)
    }

    async fn open(&self) -> Result<tokio_rusqlite::Connection, VaultwardError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| VaultwardError::io("create", parent, e))?;
        }
        let conn = tokio_rusqlite::Connection::open(&self.path)
            .await
            .map_err(|e| VaultwardError::Storage {
                source: Box::new(e),
            })?;
        conn.call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch(SCHEMA) })
            .await
            .map_err(map_tr_err)?;
        Ok(conn)
    }

    /// Unwrap the master key, creating it on first use.
    async fn master_key(
        &self,
        conn: &tokio_rusqlite::Connection,
        passphrase: &SecretString,
        create: bool,
    ) -> Result<Option<Zeroizing<[u8; 32]>>, VaultwardError> {
        let meta = conn
            .call(|conn| -> Result<Option<VaultMeta>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT value FROM vault_meta WHERE key = ?1")?;
                let mut get = |key: &str| -> Result<Option<Vec<u8>>, rusqlite::Error> {
                    match stmt.query_row(params![key], |row| row.get(0)) {
                        Ok(value) => Ok(Some(value)),
                        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                        Err(e) => Err(e),
                    }
                };
                let Some(wrapped_master_key) = get("wrapped_master_key")? else {
                    return Ok(None);
                };
                Ok(Some(VaultMeta {
                    wrapped_master_key,
                    nonce: get("master_key_nonce")?.unwrap_or_default(),
                    salt: get("kdf_salt")?.unwrap_or_default(),
                    kdf_params_bytes: get("kdf_params")?.unwrap_or_default(),
                }))
            })
            .await
            .map_err(map_tr_err)?;

        match meta {
            Some(meta) => Ok(Some(unwrap_master_key(&meta, passphrase)?)),
            None if create => Ok(Some(self.create_master_key(conn, passphrase).await?)),
            None => Ok(None),
        }
    }

    async fn create_master_key(
        &self,
        conn: &tokio_rusqlite::Connection,
        passphrase: &SecretString,
    ) -> Result<Zeroizing<[u8; 32]>, VaultwardError> {
        let master_key = Zeroizing::new(crypto::generate_random_key()?);

        let salt = kdf::generate_salt()?;
        let wrapping_key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &self.kdf)?;
        let (wrapped_master_key, wrap_nonce) = crypto::seal(&wrapping_key, &*master_key, b"")?;

        let kdf_params = serde_json::json!({
            "memory_cost": self.kdf.memory_cost,
            "iterations": self.kdf.iterations,
            "parallelism": self.kdf.parallelism,
        });
        let kdf_params_bytes = kdf_params.to_string().into_bytes();
        let salt_vec = salt.to_vec();
        let wrap_nonce_vec = wrap_nonce.to_vec();

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            for (key, value) in [
                ("wrapped_master_key", wrapped_master_key),
                ("master_key_nonce", wrap_nonce_vec),
                ("kdf_salt", salt_vec),
                ("kdf_params", kdf_params_bytes),
            ] {
                tx.execute(
                    "INSERT OR REPLACE INTO vault_meta (key, value) VALUES (?1, ?2)",
                    params![key, value],
                )?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)?;

        info!(path = %self.path.display(), "secure credential store created");
        Ok(master_key)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn store(
        &self,
        role: CredentialRole,
        credential: &SecretString,
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        let conn = self.open().await?;
        let result = self.store_with(&conn, role, credential, passphrase).await;
        close(conn).await?;
        result?;

        debug!(role = %role, "credential stored");
        Ok(())
    }

    async fn retrieve(
        &self,
        role: CredentialRole,
        passphrase: &SecretString,
    ) -> Result<Option<SecretString>, VaultwardError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let conn = self.open().await?;
        let result = self.retrieve_with(&conn, role, passphrase).await;
        close(conn).await?;
        result
    }
}

impl SqliteCredentialStore {
    async fn store_with(
        &self,
        conn: &tokio_rusqlite::Connection,
        role: CredentialRole,
        credential: &SecretString,
        passphrase: &SecretString,
    ) -> Result<(), VaultwardError> {
        let master_key = self
            .master_key(conn, passphrase, true)
            .await?
            .ok_or_else(|| VaultwardError::Internal("master key was not created".into()))?;
        let role_name = role.to_string();
        let (ciphertext, nonce) = crypto::seal(
            &master_key,
            credential.expose_secret().as_bytes(),
            role_name.as_bytes(),
        )?;
        let nonce_vec = nonce.to_vec();
        let stored_at = chrono::Utc::now().to_rfc3339();

        conn.call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO credentials (role, ciphertext, nonce, stored_at) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![role_name, ciphertext, nonce_vec, stored_at],
            )
        })
        .await
        .map_err(map_tr_err)?;
        Ok(())
    }

    async fn retrieve_with(
        &self,
        conn: &tokio_rusqlite::Connection,
        role: CredentialRole,
        passphrase: &SecretString,
    ) -> Result<Option<SecretString>, VaultwardError> {
        let Some(master_key) = self.master_key(conn, passphrase, false).await? else {
            return Ok(None);
        };
        let role_name = role.to_string();
        let aad = role_name.clone();
        type CipherNonce = (Vec<u8>, Vec<u8>);
        let entry = conn
            .call(move |conn| -> Result<Option<CipherNonce>, rusqlite::Error> {
                let result = conn.query_row(
                    "SELECT ciphertext, nonce FROM credentials WHERE role = ?1",
                    params![role_name],
                    |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)),
                );
                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)?;

        let Some((ciphertext, nonce_vec)) = entry else {
            return Ok(None);
        };
        let nonce: [u8; crypto::NONCE_LEN] = nonce_vec.try_into().map_err(|_| {
            VaultwardError::Crypto("corrupted nonce in credential entry".to_string())
        })?;
        let plaintext = Zeroizing::new(crypto::open(
            &master_key,
            &nonce,
            &ciphertext,
            aad.as_bytes(),
        )?);
        let value = String::from_utf8(plaintext.to_vec()).map_err(|e| {
            VaultwardError::Crypto(format!("decrypted credential is not valid UTF-8: {e}"))
        })?;
        Ok(Some(SecretString::from(value)))
    }
}

/// Raw `vault_meta` entries.
struct VaultMeta {
    wrapped_master_key: Vec<u8>,
    nonce: Vec<u8>,
    salt: Vec<u8>,
    kdf_params_bytes: Vec<u8>,
}

fn unwrap_master_key(
    meta: &VaultMeta,
    passphrase: &SecretString,
) -> Result<Zeroizing<[u8; 32]>, VaultwardError> {
    let kdf_params: serde_json::Value = serde_json::from_slice(&meta.kdf_params_bytes)
        .map_err(|e| VaultwardError::Crypto(format!("corrupted KDF params: {e}")))?;
    let field = |name: &str| -> Result<u32, VaultwardError> {
        kdf_params[name]
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| VaultwardError::Crypto(format!("missing {name} in KDF params")))
    };
    let params = KdfConfig {
        memory_cost: field("memory_cost")?,
        iterations: field("iterations")?,
        parallelism: field("parallelism")?,
    };

    let salt: [u8; kdf::SALT_LEN] = meta
        .salt
        .clone()
        .try_into()
        .map_err(|_| VaultwardError::Crypto("corrupted salt (expected 16 bytes)".to_string()))?;
    let nonce: [u8; crypto::NONCE_LEN] = meta
        .nonce
        .clone()
        .try_into()
        .map_err(|_| VaultwardError::Crypto("corrupted nonce (expected 12 bytes)".to_string()))?;

    let wrapping_key = kdf::derive_key(passphrase.expose_secret().as_bytes(), &salt, &params)?;
    let master_key_bytes = Zeroizing::new(
        crypto::open(&wrapping_key, &nonce, &meta.wrapped_master_key, b"").map_err(|_| {
            VaultwardError::Crypto(
                "invalid passphrase or corrupted credential store -- decryption failed"
                    .to_string(),
            )
        })?,
    );

    let master_key: [u8; 32] = master_key_bytes.as_slice().try_into().map_err(|_| {
        VaultwardError::Crypto("corrupted master key (expected 32 bytes)".to_string())
    })?;
    Ok(Zeroizing::new(master_key))
}

async fn close(conn: tokio_rusqlite::Connection) -> Result<(), VaultwardError> {
    conn.close()
        .await
        .map_err(|e| VaultwardError::Internal(format!("failed to close credential database: {e}")))
}

/// Convert tokio-rusqlite errors to [`VaultwardError::Storage`].
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultwardError {
    VaultwardError::Storage {
        source: format!("credential database error: {e}").into(),
    }
}
