// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequences scan, backup, and migrate across the three domains.
//!
//! Every public operation runs to completion before returning. Domain
//! failures never abort the run: each domain's outcome is folded into one
//! [`ComprehensiveMigrationResult`], and the backups taken along the way are
//! handed back for [`MigrationOrchestrator::rollback_all_migrations`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{error, info, warn};
use vaultward_config::VaultwardConfig;
use vaultward_core::{
    AuditSink, CredentialStore, Domain, ErrorClass, FileEncryptor, MetadataStore,
};
use vaultward_vault::{EncryptedCatalogStore, EnvelopeFileEncryptor, SqliteCredentialStore};

use crate::backup::{BackupManager, BackupRecord};
use crate::layout::VaultLayout;
use crate::migrators::{
    DomainMigrator, DomainOutcome, FileMigrator, MetadataMigrator, PasswordMigrator,
};
use crate::scanner::{LegacyScanner, MigrationAssessment};
use crate::status::MigrationStatus;

/// Outcome of one [`MigrationOrchestrator::perform_comprehensive_migration`] run.
#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveMigrationResult {
    /// True iff every domain that needed migration migrated without error.
    pub success: bool,
    pub message: String,
    pub backup_record: BackupRecord,
    pub migration_log: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// The secure stores each domain migrates into.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<dyn CredentialStore>,
    pub files: Arc<dyn FileEncryptor>,
    pub catalog: Arc<dyn MetadataStore>,
}

impl Collaborators {
    /// The production stores for `layout`, keyed with `config.kdf`.
    pub fn for_vault(layout: &VaultLayout, config: &VaultwardConfig) -> Self {
        Self {
            credentials: Arc::new(SqliteCredentialStore::new(
                &layout.credential_db,
                config.kdf,
            )),
            files: Arc::new(EnvelopeFileEncryptor::new(config.kdf)),
            catalog: Arc::new(EncryptedCatalogStore::new(
                &layout.encrypted_catalog,
                config.kdf,
            )),
        }
    }
}

pub struct MigrationOrchestrator {
    scanner: LegacyScanner,
    backups: BackupManager,
    passwords: PasswordMigrator,
    files: FileMigrator,
    metadata: MetadataMigrator,
    audit: Arc<dyn AuditSink>,
}

impl MigrationOrchestrator {
    pub fn new(
        layout: VaultLayout,
        collaborators: Collaborators,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            scanner: LegacyScanner::new(layout.clone(), collaborators.files.clone()),
            passwords: PasswordMigrator::new(&layout.passwords_file, collaborators.credentials),
            files: FileMigrator::new(&layout.files_dir, collaborators.files),
            metadata: MetadataMigrator::new(&layout.metadata_file, collaborators.catalog),
            backups: BackupManager::new(layout),
            audit,
        }
    }

    /// Wire the production collaborators for the vault described by `config`.
    pub fn from_config(config: &VaultwardConfig, audit: Arc<dyn AuditSink>) -> Self {
        let layout = VaultLayout::from_config(config);
        let collaborators = Collaborators::for_vault(&layout, config);
        Self::new(layout, collaborators, audit)
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Read-only scan of the vault.
    pub fn assess(&self) -> MigrationAssessment {
        self.scanner.assess()
    }

    fn migrator(&self, domain: Domain) -> &dyn DomainMigrator {
        match domain {
            Domain::Passwords => &self.passwords,
            Domain::Files => &self.files,
            Domain::Metadata => &self.metadata,
        }
    }

    /// Migrate every domain that still holds plaintext.
    ///
    /// A missing or empty passphrase is rejected before anything is scanned
    /// or backed up. Otherwise each pending domain is backed up and migrated
    /// in order Password, File, Metadata; a domain whose backup fails is not
    /// migrated.
    pub async fn perform_comprehensive_migration(
        &self,
        passphrase: Option<&SecretString>,
    ) -> ComprehensiveMigrationResult {
        let start_time = Utc::now();

        let Some(passphrase) = passphrase.filter(|p| !p.expose_secret().is_empty()) else {
            let rejection = DomainOutcome::failure(
                Domain::Passwords,
                ErrorClass::Input,
                "passphrase is missing or empty".to_string(),
            );
            warn!("migration rejected: no passphrase");
            return self.finish(
                start_time,
                false,
                "Password migration failed: a non-empty passphrase is required".to_string(),
                BackupRecord::new(),
                rejection.log,
            );
        };

        let assessment = self.assess();
        let pending = assessment.pending();
        if pending.is_empty() {
            info!("vault already secure, nothing to migrate");
            return self.finish(
                start_time,
                true,
                "No migration was necessary; vault is already fully secure".to_string(),
                BackupRecord::new(),
                Vec::new(),
            );
        }

        info!(domains = ?pending, "migration started");
        self.audit.record(&format!(
            "Migration started for {} domain(s)",
            pending.len()
        ));

        let mut record = BackupRecord::new();
        let mut log = Vec::new();
        let mut failures = Vec::new();
        for domain in pending.iter().copied() {
            let outcome = match self.backups.backup(domain) {
                Ok(path) => {
                    self.audit.record(&format!(
                        "{}: backup created at {}",
                        domain.label(),
                        path.display()
                    ));
                    record.insert(domain, path);
                    self.migrator(domain).migrate(passphrase).await
                }
                Err(e) => {
                    error!(domain = %domain, error = %e, "backup failed, domain skipped");
                    DomainOutcome::failure(
                        domain,
                        e.class(),
                        format!("backup could not be created: {e}"),
                    )
                }
            };

            for line in &outcome.log {
                self.audit.record(line);
            }
            if outcome.success {
                info!(domain = %domain, "domain migrated");
            } else {
                warn!(domain = %domain, reason = ?outcome.reason, "domain migration failed");
                failures.push(outcome.clone());
            }
            log.extend(outcome.log);
        }

        let success = failures.is_empty();
        let message = if success {
            format!(
                "Migration completed successfully for {} domain(s)",
                pending.len()
            )
        } else {
            let names: Vec<&str> = failures.iter().map(|o| o.domain.label()).collect();
            let reasons: Vec<&str> = failures
                .iter()
                .filter_map(|o| o.reason.as_deref())
                .collect();
            format!(
                "Migration failed: {} ({})",
                names.join(", "),
                reasons.join("; ")
            )
        };
        self.finish(start_time, success, message, record, log)
    }

    fn finish(
        &self,
        start_time: DateTime<Utc>,
        success: bool,
        message: String,
        backup_record: BackupRecord,
        migration_log: Vec<String>,
    ) -> ComprehensiveMigrationResult {
        self.audit.record(&message);
        ComprehensiveMigrationResult {
            success,
            message,
            backup_record,
            migration_log,
            start_time,
            end_time: Utc::now(),
        }
    }

    /// Restore every domain in `record` from its backup.
    ///
    /// Domains are restored in reverse migration order. A failed restore does
    /// not stop the others; returns true iff every restore succeeded.
    pub fn rollback_all_migrations(&self, record: &BackupRecord) -> bool {
        let mut all_restored = true;
        for (domain, path) in record.iter().rev() {
            match self.backups.restore(domain, path) {
                Ok(()) => self.audit.record(&format!(
                    "{}: rolled back from {}",
                    domain.label(),
                    path.display()
                )),
                Err(e) => {
                    all_restored = false;
                    error!(domain = %domain, error = %e, "rollback failed");
                    self.audit
                        .record(&format!("{}: rollback failed: {e}", domain.label()));
                }
            }
        }
        all_restored
    }

    /// Snapshot of the vault's current migration state.
    pub fn get_detailed_migration_status(&self) -> MigrationStatus {
        MigrationStatus::new(
            self.assess(),
            self.passwords.describe_status(),
            self.files.describe_status(),
            self.metadata.describe_status(),
        )
    }
}
