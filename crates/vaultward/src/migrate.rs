// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vaultward migrate`, `vaultward rollback` and `vaultward discard-backups`.
//!
//! A migration persists its backup record next to the backups so a later
//! `rollback` or `discard-backups` run can find them.

use std::path::Path;
use std::sync::Arc;

use vaultward_config::model::VaultwardConfig;
use vaultward_core::VaultwardError;
use vaultward_migrate::{
    BackupRecord, ComprehensiveMigrationResult, MigrationOrchestrator, TracingAuditSink,
};

/// File name of the backup record written by `migrate`.
pub const RECORD_FILE_NAME: &str = "last-migration.json";

/// Run the `vaultward migrate` command.
///
/// Returns `Ok(false)` when the migration reported failure. The backup
/// record is written even then, so the partial migration can be rolled back.
pub async fn run_migrate(
    config: &VaultwardConfig,
    json: bool,
    record: Option<&Path>,
) -> Result<bool, VaultwardError> {
    let orchestrator = MigrationOrchestrator::from_config(config, Arc::new(TracingAuditSink));
    let record_path = crate::record_path(config, record);

    let passphrase = match vaultward_vault::get_passphrase_with_confirm() {
        Ok(passphrase) => Some(passphrase),
        Err(e) => {
            tracing::warn!(error = %e, "no passphrase available");
            None
        }
    };

    let result = orchestrator
        .perform_comprehensive_migration(passphrase.as_ref())
        .await;

    // Print first: the backup paths must reach the user even if the record
    // cannot be written.
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!();
        for line in result_lines(&result, &record_path) {
            println!("{line}");
        }
        println!();
    }

    save_record(&result, &record_path)?;
    Ok(result.success)
}

/// Persist the backup record when the migration took any backup.
pub fn save_record(
    result: &ComprehensiveMigrationResult,
    record_path: &Path,
) -> Result<(), VaultwardError> {
    if result.backup_record.is_empty() {
        return Ok(());
    }
    result.backup_record.save(record_path)?;
    tracing::info!(record = %record_path.display(), "backup record written");
    Ok(())
}

fn result_lines(result: &ComprehensiveMigrationResult, record_path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = result
        .migration_log
        .iter()
        .map(|line| format!("  {line}"))
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("  {}", result.message));

    if !result.backup_record.is_empty() {
        for (domain, path) in result.backup_record.iter() {
            lines.push(format!("  Backup ({domain}): {}", path.display()));
        }
        lines.push(format!("  Backup record: {}", record_path.display()));
        if result.success {
            lines.push("  Remove backups with: vaultward discard-backups".to_string());
        } else {
            lines.push("  Undo with: vaultward rollback".to_string());
        }
    }
    lines
}

/// Run the `vaultward rollback` command.
pub fn run_rollback(config: &VaultwardConfig, record: Option<&Path>) -> Result<bool, VaultwardError> {
    let orchestrator = MigrationOrchestrator::from_config(config, Arc::new(TracingAuditSink));
    let record_path = crate::record_path(config, record);
    let restored = rollback_from_record(&orchestrator, &record_path)?;

    if restored {
        println!("Rollback complete: vault restored from {}", record_path.display());
    } else {
        eprintln!("Rollback incomplete: at least one domain could not be restored (see log)");
    }
    Ok(restored)
}

/// Load a backup record and restore every domain it names.
pub fn rollback_from_record(
    orchestrator: &MigrationOrchestrator,
    record_path: &Path,
) -> Result<bool, VaultwardError> {
    let record = BackupRecord::load(record_path)?;
    if record.is_empty() {
        return Err(VaultwardError::InvalidInput(format!(
            "backup record {} names no backups",
            record_path.display()
        )));
    }
    Ok(orchestrator.rollback_all_migrations(&record))
}

/// Run the `vaultward discard-backups` command.
pub fn run_discard(config: &VaultwardConfig, record: Option<&Path>) -> Result<bool, VaultwardError> {
    let orchestrator = MigrationOrchestrator::from_config(config, Arc::new(TracingAuditSink));
    let record_path = crate::record_path(config, record);
    let removed = discard_from_record(&orchestrator, &record_path)?;
    println!("Discarded {removed} backup(s)");
    Ok(true)
}

/// Delete the backups a record names, then the record itself.
pub fn discard_from_record(
    orchestrator: &MigrationOrchestrator,
    record_path: &Path,
) -> Result<usize, VaultwardError> {
    let record = BackupRecord::load(record_path)?;
    let removed = orchestrator.backups().discard(&record)?;
    std::fs::remove_file(record_path)
        .map_err(|e| VaultwardError::io("remove", record_path, e))?;
    Ok(removed)
}
