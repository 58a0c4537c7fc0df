// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-file envelope encryption for the vault's file payloads.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;
use vaultward_config::KdfConfig;
use vaultward_core::{FileEncryptor, VaultwardError};
use zeroize::Zeroizing;

use crate::envelope;
use crate::wipe;

/// Extension appended to the name of every encrypted payload.
pub const ENCRYPTED_EXTENSION: &str = "enc";

/// Encrypts each payload into a sibling `<name>.enc` envelope and scrubs the
/// plaintext original.
#[derive(Debug, Clone)]
pub struct EnvelopeFileEncryptor {
    kdf: KdfConfig,
}

impl EnvelopeFileEncryptor {
    pub fn new(kdf: KdfConfig) -> Self {
        Self { kdf }
    }

    /// Decrypt an encrypted payload in memory.
    pub fn decrypt(
        &self,
        path: &Path,
        passphrase: &SecretString,
    ) -> Result<Zeroizing<Vec<u8>>, VaultwardError> {
        let sealed = fs::read(path).map_err(|e| VaultwardError::io("read", path, e))?;
        envelope::open(passphrase, &sealed)
    }
}

/// `<path>.enc`, keeping the original name intact.
pub fn encrypted_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ENCRYPTED_EXTENSION);
    PathBuf::from(name)
}

#[async_trait]
impl FileEncryptor for EnvelopeFileEncryptor {
    async fn encrypt(
        &self,
        path: &Path,
        passphrase: &SecretString,
    ) -> Result<PathBuf, VaultwardError> {
        let plaintext =
            Zeroizing::new(fs::read(path).map_err(|e| VaultwardError::io("read", path, e))?);
        if envelope::is_sealed(&plaintext) {
            return Err(VaultwardError::InvalidInput(format!(
                "{} is already encrypted",
                path.display()
            )));
        }

        let target = encrypted_path(path);
        if target.exists() {
            return Err(VaultwardError::InvalidInput(format!(
                "refusing to overwrite existing {}",
                target.display()
            )));
        }

        let sealed = envelope::seal(passphrase, &plaintext, &self.kdf)?;
        wipe::write_atomic(&target, &sealed)?;

        // Confirm the envelope on disk opens before the plaintext goes away.
        if let Err(e) = self.decrypt(&target, passphrase) {
            let _ = fs::remove_file(&target);
            return Err(e);
        }
        wipe::scrub_and_remove(path)?;

        debug!(
            source = %path.display(),
            target = %target.display(),
            bytes = plaintext.len(),
            "file encrypted"
        );
        Ok(target)
    }

    fn is_encrypted(&self, path: &Path) -> Result<bool, VaultwardError> {
        let mut file = File::open(path).map_err(|e| VaultwardError::io("open", path, e))?;
        let mut marker = [0u8; envelope::MARKER_LEN];
        let mut filled = 0;
        while filled < marker.len() {
            let n = file
                .read(&mut marker[filled..])
                .map_err(|e| VaultwardError::io("read", path, e))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(envelope::is_sealed(&marker[..filled]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FAST: KdfConfig = KdfConfig {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
    };

    fn pass() -> SecretString {
        SecretString::from("file passphrase".to_string())
    }

    #[test]
    fn encrypted_path_appends_extension() {
        assert_eq!(
            encrypted_path(Path::new("/v/files/report.pdf")),
            PathBuf::from("/v/files/report.pdf.enc")
        );
        assert_eq!(
            encrypted_path(Path::new("notes")),
            PathBuf::from("notes.enc")
        );
    }

    #[tokio::test]
    async fn encrypt_replaces_plaintext_with_envelope() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo.jpg");
        fs::write(&source, b"\xff\xd8 jpeg bytes").unwrap();
        let encryptor = EnvelopeFileEncryptor::new(FAST);

        let target = encryptor.encrypt(&source, &pass()).await.unwrap();

        assert_eq!(target, dir.path().join("photo.jpg.enc"));
        assert!(!source.exists());
        assert!(encryptor.is_encrypted(&target).unwrap());
        let plain = encryptor.decrypt(&target, &pass()).unwrap();
        assert_eq!(plain.as_slice(), b"\xff\xd8 jpeg bytes");
    }

    #[tokio::test]
    async fn encrypt_refuses_to_clobber_existing_target() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, b"plain").unwrap();
        fs::write(dir.path().join("a.txt.enc"), b"something else").unwrap();

        let err = EnvelopeFileEncryptor::new(FAST)
            .encrypt(&source, &pass())
            .await
            .unwrap_err();
        assert!(matches!(err, VaultwardError::InvalidInput(_)));
        assert!(source.exists(), "plaintext must be left in place");
    }

    #[tokio::test]
    async fn encrypt_rejects_already_sealed_input() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("b.bin");
        fs::write(&source, envelope::seal(&pass(), b"x", &FAST).unwrap()).unwrap();

        let err = EnvelopeFileEncryptor::new(FAST)
            .encrypt(&source, &pass())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already encrypted"));
    }

    #[test]
    fn is_encrypted_handles_short_and_plain_files() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        let short = dir.path().join("short");
        let plain = dir.path().join("plain");
        fs::write(&empty, b"").unwrap();
        fs::write(&short, b"VW").unwrap();
        fs::write(&plain, b"hello world").unwrap();

        let encryptor = EnvelopeFileEncryptor::new(FAST);
        assert!(!encryptor.is_encrypted(&empty).unwrap());
        assert!(!encryptor.is_encrypted(&short).unwrap());
        assert!(!encryptor.is_encrypted(&plain).unwrap());
    }

    #[test]
    fn is_encrypted_on_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = EnvelopeFileEncryptor::new(FAST)
            .is_encrypted(&dir.path().join("gone"))
            .unwrap_err();
        assert!(matches!(err, VaultwardError::Io { .. }));
    }
}
