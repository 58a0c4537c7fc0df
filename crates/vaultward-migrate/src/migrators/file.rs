// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypts every plaintext payload under the file storage directory.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, warn};
use vaultward_core::{Domain, FileEncryptor};

use super::{DomainMigrator, DomainOutcome};
use crate::scanner::walk_files;

pub struct FileMigrator {
    files_dir: PathBuf,
    encryptor: Arc<dyn FileEncryptor>,
}

impl FileMigrator {
    pub fn new(files_dir: impl Into<PathBuf>, encryptor: Arc<dyn FileEncryptor>) -> Self {
        Self {
            files_dir: files_dir.into(),
            encryptor,
        }
    }
}

#[async_trait]
impl DomainMigrator for FileMigrator {
    fn domain(&self) -> Domain {
        Domain::Files
    }

    /// Encrypt each pending file, continuing past individual failures.
    ///
    /// A file that cannot be inspected counts as a failure for that file
    /// only.
    async fn migrate(&self, passphrase: &SecretString) -> DomainOutcome {
        if !self.files_dir.is_dir() {
            return DomainOutcome::succeeded(Domain::Files, "no files need migration");
        }
        let files = match walk_files(&self.files_dir) {
            Ok(files) => files,
            Err(e) => return DomainOutcome::failed(Domain::Files, &e),
        };

        let label = Domain::Files.label();
        let mut attempted = 0usize;
        let mut details = Vec::new();
        let mut failed = Vec::new();
        for path in &files {
            match self.encryptor.is_encrypted(path) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "payload could not be inspected");
                    attempted += 1;
                    details.push(format!(
                        "{label}: could not inspect {}: {e}",
                        path.display()
                    ));
                    failed.push(e);
                    continue;
                }
            }
            attempted += 1;
            match self.encryptor.encrypt(path, passphrase).await {
                Ok(target) => debug!(target = %target.display(), "payload encrypted"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "payload could not be encrypted");
                    details.push(format!(
                        "{label}: could not encrypt {}: {e}",
                        path.display()
                    ));
                    failed.push(e);
                }
            }
        }

        if attempted == 0 {
            return DomainOutcome::succeeded(Domain::Files, "no files need migration");
        }
        match failed.first() {
            None => DomainOutcome::succeeded(
                Domain::Files,
                &format!("{attempted} file(s) encrypted"),
            ),
            Some(first) => DomainOutcome::failure(
                Domain::Files,
                first.class(),
                format!(
                    "{} of {attempted} file(s) could not be encrypted",
                    failed.len()
                ),
            )
            .with_details(details),
        }
    }

    fn describe_status(&self) -> String {
        if !self.files_dir.is_dir() {
            return "no file storage directory".to_string();
        }
        match walk_files(&self.files_dir) {
            Ok(files) => {
                let encrypted = files
                    .iter()
                    .filter(|path| matches!(self.encryptor.is_encrypted(path), Ok(true)))
                    .count();
                let plaintext = files.len() - encrypted;
                if plaintext == 0 {
                    format!("all {encrypted} file(s) encrypted")
                } else {
                    format!("{plaintext} of {} file(s) still plaintext", files.len())
                }
            }
            Err(e) => format!("file storage directory unreadable: {e}"),
        }
    }
}
