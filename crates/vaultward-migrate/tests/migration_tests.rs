// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the migration engine against real temp vaults.

use std::fs;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use vaultward_core::{CredentialRole, CredentialStore, Domain, MetadataStore};
use vaultward_migrate::{BackupRecord, Collaborators};
use vaultward_test_utils::TestHarness;
use vaultward_test_utils::mocks::{MemoryCredentialStore, MemoryMetadataStore, RejectingFileEncryptor};
use vaultward_vault::{
    EncryptedCatalogStore, EnvelopeFileEncryptor, SqliteCredentialStore, envelope,
};

const LABELS: [&str; 3] = ["Password Migration", "File Migration", "Metadata Migration"];

/// Index of the first log line mentioning each label, in label order.
fn first_mentions(log: &[String]) -> Vec<Option<usize>> {
    LABELS
        .iter()
        .map(|label| log.iter().position(|line| line.contains(label)))
        .collect()
}

#[tokio::test]
async fn empty_vault_needs_no_migration() {
    let harness = TestHarness::builder().build().unwrap();

    assert!(!harness.orchestrator.assess().needs_any_migration());

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;
    assert!(result.success);
    assert!(result.message.contains("No migration was necessary"));
    assert!(result.backup_record.is_empty());
    assert!(harness.snapshot().is_empty());
}

#[tokio::test]
async fn full_legacy_vault_migrates_and_becomes_secure() {
    let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
    let before = harness.orchestrator.assess();
    assert!(before.needs_password_migration());
    assert!(before.needs_file_migration());
    assert!(before.needs_metadata_migration());

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    assert!(result.success, "{}: {:?}", result.message, result.migration_log);
    assert_eq!(result.message, "Migration completed successfully for 3 domain(s)");
    assert!(result.start_time <= result.end_time);
    assert_eq!(result.backup_record.len(), 3);

    let after = harness.orchestrator.assess();
    assert!(!after.needs_password_migration());
    assert!(!after.needs_file_migration());
    assert!(!after.needs_metadata_migration());
    assert!(harness.orchestrator.get_detailed_migration_status().is_fully_secure);

    // Secure forms are readable with the passphrase.
    let credentials = SqliteCredentialStore::new(&harness.layout.credential_db, harness.config.kdf);
    let panic = credentials
        .retrieve(CredentialRole::Panic, &harness.passphrase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(panic.expose_secret(), "panic-secret");

    let catalog = EncryptedCatalogStore::new(&harness.layout.encrypted_catalog, harness.config.kdf);
    let records = catalog.read_catalog(&harness.passphrase()).await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].original_name.as_deref(), Some("IMG_0042.jpg"));

    let report = harness.layout.files_dir.join("report.pdf.enc");
    let plain = EnvelopeFileEncryptor::new(harness.config.kdf)
        .decrypt(&report, &harness.passphrase())
        .unwrap();
    assert_eq!(plain.as_slice(), b"%PDF-1.7 quarterly numbers");

    // No plaintext remains outside the backups.
    assert!(!harness.layout.passwords_file.exists());
    assert!(!harness.layout.metadata_file.exists());
    assert!(!harness.layout.files_dir.join("report.pdf").exists());
}

#[tokio::test]
async fn missing_passphrase_fails_without_touching_disk() {
    let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
    let before = harness.snapshot();

    let result = harness.orchestrator.perform_comprehensive_migration(None).await;

    assert!(!result.success);
    assert!(result.message.contains("Password migration failed"));
    assert_eq!(result.migration_log.len(), 1);
    assert!(result.backup_record.is_empty());
    assert_eq!(harness.snapshot(), before);
    assert!(!harness.layout.backup_dir.exists());
}

#[tokio::test]
async fn rollback_restores_pre_migration_state() {
    let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
    let before = harness.snapshot();

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;
    assert!(result.success);
    assert!(!harness.orchestrator.assess().needs_any_migration());

    assert!(harness.orchestrator.rollback_all_migrations(&result.backup_record));

    assert!(harness.orchestrator.assess().needs_any_migration());
    assert_eq!(harness.snapshot(), before);
    assert!(!harness.layout.credential_db.exists());
    assert!(!harness.layout.encrypted_catalog.exists());
    // Backups are kept until explicitly discarded.
    assert!(result.backup_record.iter().all(|(_, path)| path.exists()));
}

#[tokio::test]
async fn rollback_works_from_a_persisted_record() {
    let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
    let before = harness.snapshot();
    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    let record_path = harness.layout.backup_dir.join("last-migration.json");
    result.backup_record.save(&record_path).unwrap();
    let loaded = BackupRecord::load(&record_path).unwrap();

    assert!(harness.orchestrator.rollback_all_migrations(&loaded));
    assert_eq!(harness.snapshot(), before);

    assert_eq!(harness.orchestrator.backups().discard(&loaded).unwrap(), 3);
}

#[tokio::test]
async fn malformed_metadata_does_not_block_other_domains() {
    let harness = TestHarness::builder()
        .with_passwords("m\nd\np\n")
        .with_file("notes.txt", b"plain notes")
        .with_metadata("[{\"file_name\": \"notes.txt\", \"size_bytes\": ")
        .build()
        .unwrap();

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    assert!(!result.success);
    assert!(result.message.contains("failed"));
    assert!(result.message.contains("Metadata Migration"));
    assert!(!result.message.contains("Password Migration"));

    let log = &result.migration_log;
    assert!(log.iter().any(|l| l.starts_with("Password Migration: succeeded")));
    assert!(log.iter().any(|l| l.starts_with("File Migration: succeeded")));
    assert!(log.iter().any(|l| l.starts_with("Metadata Migration: failed [parse]")));

    let after = harness.orchestrator.assess();
    assert!(!after.needs_password_migration());
    assert!(!after.needs_file_migration());
    assert!(after.needs_metadata_migration());
    // Every attempted domain was backed up, including the failed one.
    assert!(result.backup_record.get(Domain::Metadata).is_some());
}

#[tokio::test]
async fn log_mentions_each_domain_in_order() {
    let harness = TestHarness::builder().with_legacy_vault().build().unwrap();
    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    let mentions = first_mentions(&result.migration_log);
    let positions: Vec<usize> = mentions.iter().map(|m| m.unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", result.migration_log);

    // The same lines reached the audit sink.
    let events = harness.audit.events();
    for line in &result.migration_log {
        assert!(events.contains(line), "{line} not audited");
    }
    assert_eq!(events.last(), Some(&result.message));
}

#[tokio::test]
async fn only_pending_domains_are_attempted() {
    let harness = TestHarness::builder()
        .with_file("a.txt", b"a")
        .build()
        .unwrap();

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    assert!(result.success);
    assert_eq!(first_mentions(&result.migration_log), vec![None, Some(0), None]);
    assert_eq!(result.backup_record.len(), 1);
    assert!(result.backup_record.get(Domain::Files).is_some());
}

#[tokio::test]
async fn one_failing_file_fails_the_domain_but_encrypts_the_rest() {
    let harness = TestHarness::builder()
        .with_file("keep.txt", b"k")
        .with_file("broken.txt", b"b")
        .with_collaborators(|layout| Collaborators {
            credentials: Arc::new(MemoryCredentialStore::default()),
            files: Arc::new(RejectingFileEncryptor::new(
                EnvelopeFileEncryptor::new(vaultward_test_utils::FAST_KDF),
                "broken.txt",
            )),
            catalog: Arc::new(EncryptedCatalogStore::new(
                &layout.encrypted_catalog,
                vaultward_test_utils::FAST_KDF,
            )),
        })
        .build()
        .unwrap();

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    assert!(!result.success);
    assert!(result.message.contains("File Migration"));
    assert!(harness.layout.files_dir.join("keep.txt.enc").exists());
    assert!(harness.layout.files_dir.join("broken.txt").exists());

    let status = harness.orchestrator.get_detailed_migration_status();
    assert!(!status.is_fully_secure);
    assert_eq!(status.file_encryption_status, "1 of 2 file(s) still plaintext");
}

#[tokio::test]
async fn wrong_passphrase_on_existing_store_fails_password_domain() {
    let harness = TestHarness::builder()
        .with_passwords("m\nd\np\n")
        .build()
        .unwrap();
    // A secure store keyed by a different passphrase already exists.
    SqliteCredentialStore::new(&harness.layout.credential_db, harness.config.kdf)
        .store(
            CredentialRole::Master,
            &SecretString::from("old".to_string()),
            &SecretString::from("another passphrase".to_string()),
        )
        .await
        .unwrap();
    let db_before = fs::read(&harness.layout.credential_db).unwrap();

    let result = harness
        .orchestrator
        .perform_comprehensive_migration(Some(&harness.passphrase()))
        .await;

    assert!(!result.success);
    assert!(result.migration_log[0].starts_with("Password Migration: failed [crypto]"));
    assert!(harness.layout.passwords_file.exists());

    // Rollback returns the credential db to its pre-migration bytes.
    assert!(harness.orchestrator.rollback_all_migrations(&result.backup_record));
    assert_eq!(fs::read(&harness.layout.credential_db).unwrap(), db_before);
}

#[tokio::test]
async fn already_encrypted_files_are_left_alone() {
    let sealed = envelope::seal(
        &SecretString::from("p".to_string()),
        b"done",
        &vaultward_test_utils::FAST_KDF,
    )
    .unwrap();
    let harness = TestHarness::builder()
        .with_file("done.bin.enc", &sealed)
        .build()
        .unwrap();

    assert!(!harness.orchestrator.assess().needs_any_migration());
    let status = harness.orchestrator.get_detailed_migration_status();
    assert_eq!(status.file_encryption_status, "all 1 file(s) encrypted");
    assert_eq!(status.password_status, "no plaintext password file");
}

#[tokio::test]
async fn status_reports_pending_domains_before_migration() {
    let harness = TestHarness::builder()
        .with_metadata("[]")
        .with_collaborators(|_| Collaborators {
            credentials: Arc::new(MemoryCredentialStore::default()),
            files: Arc::new(EnvelopeFileEncryptor::new(vaultward_test_utils::FAST_KDF)),
            catalog: Arc::new(MemoryMetadataStore::default()),
        })
        .build()
        .unwrap();

    let status = harness.orchestrator.get_detailed_migration_status();
    assert!(!status.is_fully_secure);
    assert!(status.assessment.needs_metadata_migration());
    assert_eq!(status.metadata_migration_status, "plaintext metadata catalog present");
    assert_eq!(status.file_encryption_status, "no file storage directory");
}
