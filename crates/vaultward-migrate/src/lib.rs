// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Migration engine that upgrades a legacy plaintext vault to its encrypted form.
//!
//! The engine assesses which domains (passwords, files, metadata) still hold
//! plaintext, backs each one up, migrates it through the secure stores, and
//! can roll every domain back from its backup.
//!
//! ```no_run
//! # async fn run() {
//! use std::sync::Arc;
//! use secrecy::SecretString;
//! use vaultward_migrate::{MigrationOrchestrator, TracingAuditSink};
//!
//! let config = vaultward_config::VaultwardConfig::default();
//! let orchestrator = MigrationOrchestrator::from_config(&config, Arc::new(TracingAuditSink));
//! let passphrase = SecretString::from("correct horse".to_string());
//! let result = orchestrator.perform_comprehensive_migration(Some(&passphrase)).await;
//! if !result.success {
//!     orchestrator.rollback_all_migrations(&result.backup_record);
//! }
//! # }
//! ```

pub mod audit;
pub mod backup;
pub mod layout;
pub mod migrators;
pub mod orchestrator;
pub mod scanner;
pub mod status;

pub use audit::{MemoryAuditSink, TracingAuditSink};
pub use backup::{BackupManager, BackupRecord};
pub use layout::VaultLayout;
pub use migrators::{DomainMigrator, DomainOutcome};
pub use orchestrator::{Collaborators, ComprehensiveMigrationResult, MigrationOrchestrator};
pub use scanner::{LegacyScanner, MigrationAssessment};
pub use status::MigrationStatus;
