// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moves the master, decoy, and panic credentials into the secure store.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use vaultward_core::{CredentialRole, CredentialStore, Domain, VaultwardError};
use zeroize::Zeroizing;

use super::{DomainMigrator, DomainOutcome};

const ARTIFACT: &str = "password file";

/// Parse the legacy password list: one credential per line, in role order.
///
/// Line terminators are stripped and blank lines skipped; everything else on
/// a line, including surrounding spaces, belongs to the credential.
pub fn parse_legacy_passwords(text: &str) -> Result<[SecretString; 3], VaultwardError> {
    let credentials: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let [master, decoy, panic] = credentials.as_slice() else {
        return Err(VaultwardError::parse(
            ARTIFACT,
            format!(
                "expected exactly 3 credentials (master, decoy, panic), found {}",
                credentials.len()
            ),
        ));
    };
    Ok([master, decoy, panic].map(|c| SecretString::from(c.to_string())))
}

pub struct PasswordMigrator {
    source: PathBuf,
    store: Arc<dyn CredentialStore>,
}

impl PasswordMigrator {
    pub fn new(source: impl Into<PathBuf>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            source: source.into(),
            store,
        }
    }

    async fn run(&self, passphrase: &SecretString) -> Result<usize, VaultwardError> {
        let bytes =
            fs::read(&self.source).map_err(|e| VaultwardError::io("read", &self.source, e))?;
        let text = Zeroizing::new(String::from_utf8(bytes).map_err(|e| {
            let message = format!("not valid UTF-8: {}", e.utf8_error());
            drop(Zeroizing::new(e.into_bytes()));
            VaultwardError::parse(ARTIFACT, message)
        })?);
        let credentials = parse_legacy_passwords(&text)?;

        for (role, credential) in CredentialRole::ORDERED.into_iter().zip(&credentials) {
            self.store.store(role, credential, passphrase).await?;
            debug!(role = %role, "credential handed to secure store");
        }

        // Only scrub the plaintext once every credential reads back intact.
        for (role, credential) in CredentialRole::ORDERED.into_iter().zip(&credentials) {
            let stored = self.store.retrieve(role, passphrase).await?;
            let matches = stored
                .as_ref()
                .is_some_and(|s| s.expose_secret() == credential.expose_secret());
            if !matches {
                return Err(VaultwardError::Crypto(format!(
                    "{role} credential did not read back from the secure store"
                )));
            }
        }

        vaultward_vault::wipe::scrub_and_remove(&self.source)?;
        info!(path = %self.source.display(), "plaintext password file removed");
        Ok(credentials.len())
    }
}

#[async_trait]
impl DomainMigrator for PasswordMigrator {
    fn domain(&self) -> Domain {
        Domain::Passwords
    }

    async fn migrate(&self, passphrase: &SecretString) -> DomainOutcome {
        match self.run(passphrase).await {
            Ok(count) => DomainOutcome::succeeded(
                Domain::Passwords,
                &format!("{count} credentials stored"),
            ),
            Err(e) => DomainOutcome::failed(Domain::Passwords, &e),
        }
    }

    fn describe_status(&self) -> String {
        if self.source.is_file() {
            "plaintext password file present".to_string()
        } else {
            "no plaintext password file".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;
    use vaultward_test_utils::mocks::{FailingCredentialStore, MemoryCredentialStore};

    fn pass() -> SecretString {
        SecretString::from("vault passphrase".to_string())
    }

    fn exposed(parsed: &[SecretString; 3]) -> Vec<&str> {
        parsed.iter().map(|s| s.expose_secret()).collect()
    }

    #[test]
    fn parse_strips_terminators_and_blank_lines() {
        let parsed = parse_legacy_passwords("hunter2\r\n\n decoy pass \npanic!\n\n").unwrap();
        assert_eq!(exposed(&parsed), vec!["hunter2", " decoy pass ", "panic!"]);
    }

    #[test]
    fn parse_requires_exactly_three() {
        let err = parse_legacy_passwords("only\ntwo\n").unwrap_err();
        assert!(err.to_string().contains("found 2"), "{err}");
        assert!(parse_legacy_passwords("a\nb\nc\nd").is_err());
        assert!(parse_legacy_passwords("").is_err());
    }

    #[tokio::test]
    async fn migrate_stores_all_roles_and_scrubs_plaintext() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("passwords.txt");
        fs::write(&source, "m\nd\np\n").unwrap();
        let store = Arc::new(MemoryCredentialStore::default());
        let migrator = PasswordMigrator::new(&source, store.clone());

        let outcome = migrator.migrate(&pass()).await;

        assert!(outcome.success, "{:?}", outcome.log);
        assert_eq!(
            outcome.log,
            vec!["Password Migration: succeeded (3 credentials stored)"]
        );
        assert!(!source.exists());
        assert_eq!(store.get(CredentialRole::Panic).as_deref(), Some("p"));
    }

    #[tokio::test]
    async fn malformed_file_fails_and_is_left_in_place() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("passwords.txt");
        fs::write(&source, "just one\n").unwrap();
        let store = Arc::new(MemoryCredentialStore::default());

        let outcome = PasswordMigrator::new(&source, store.clone())
            .migrate(&pass())
            .await;

        assert!(!outcome.success);
        assert!(outcome.log[0].starts_with("Password Migration: failed [parse]"));
        assert!(source.exists());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn non_utf8_file_is_a_parse_failure() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("passwords.txt");
        fs::write(&source, b"m\n\xff\xfe\np\n").unwrap();
        let store = Arc::new(MemoryCredentialStore::default());

        let outcome = PasswordMigrator::new(&source, store.clone())
            .migrate(&pass())
            .await;

        assert!(!outcome.success);
        assert!(
            outcome.log[0].starts_with("Password Migration: failed [parse]"),
            "{:?}",
            outcome.log
        );
        assert!(outcome.log[0].contains("UTF-8"));
        assert!(source.exists());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_failure_keeps_plaintext() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("passwords.txt");
        fs::write(&source, "m\nd\np\n").unwrap();

        let outcome = PasswordMigrator::new(&source, Arc::new(FailingCredentialStore))
            .migrate(&pass())
            .await;

        assert!(!outcome.success);
        assert!(outcome.log[0].contains("[crypto]"), "{:?}", outcome.log);
        assert!(source.exists());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_failure() {
        let dir = tempdir().unwrap();
        let outcome = PasswordMigrator::new(
            dir.path().join("passwords.txt"),
            Arc::new(MemoryCredentialStore::default()),
        )
        .migrate(&pass())
        .await;
        assert!(outcome.log[0].contains("[io]"));
    }

    proptest! {
        #[test]
        fn parse_round_trips_three_credentials(
            creds in proptest::array::uniform3("[!-~][ -~]{0,20}"),
            crlf: bool,
        ) {
            let sep = if crlf { "\r\n" } else { "\n" };
            let text = creds.join(sep);
            let parsed = parse_legacy_passwords(&text).unwrap();
            prop_assert_eq!(exposed(&parsed), creds.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
