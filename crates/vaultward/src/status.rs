// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vaultward assess` and `vaultward status` command implementation.
//!
//! Both are read-only: they scan the vault and print what still holds
//! plaintext. `--json` emits the serialized value for scripting; `--plain`
//! (or a non-TTY stdout) disables colors.

use std::io::IsTerminal;
use std::sync::Arc;

use vaultward_config::model::VaultwardConfig;
use vaultward_core::VaultwardError;
use vaultward_migrate::{MigrationAssessment, MigrationOrchestrator, MigrationStatus, TracingAuditSink};

/// Run the `vaultward assess` command.
///
/// Exits successfully whether or not migration is needed.
pub fn run_assess(config: &VaultwardConfig, json: bool) -> Result<bool, VaultwardError> {
    let orchestrator = MigrationOrchestrator::from_config(config, Arc::new(TracingAuditSink));
    let assessment = orchestrator.assess();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&assessment).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        for line in assessment_lines(&assessment) {
            println!("{line}");
        }
    }
    Ok(true)
}

fn assessment_lines(assessment: &MigrationAssessment) -> Vec<String> {
    let flag = |needed: bool| if needed { "needs migration" } else { "secure" };
    vec![
        format!("passwords: {}", flag(assessment.needs_password_migration())),
        format!("files:     {}", flag(assessment.needs_file_migration())),
        format!("metadata:  {}", flag(assessment.needs_metadata_migration())),
    ]
}

/// Run the `vaultward status` command.
pub fn run_status(config: &VaultwardConfig, json: bool, plain: bool) -> Result<bool, VaultwardError> {
    let orchestrator = MigrationOrchestrator::from_config(config, Arc::new(TracingAuditSink));
    let status = orchestrator.get_detailed_migration_status();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(true)
}

fn print_status(status: &MigrationStatus, use_color: bool) {
    let assessment = &status.assessment;
    println!();
    println!("  vaultward status");
    println!("  {}", "-".repeat(50));
    println!(
        "{}",
        status_line(
            "Passwords",
            !assessment.needs_password_migration(),
            &status.password_status,
            use_color
        )
    );
    println!(
        "{}",
        status_line(
            "Files",
            !assessment.needs_file_migration(),
            &status.file_encryption_status,
            use_color
        )
    );
    println!(
        "{}",
        status_line(
            "Metadata",
            !assessment.needs_metadata_migration(),
            &status.metadata_migration_status,
            use_color
        )
    );
    println!();

    if status.is_fully_secure {
        println!("  Vault is fully secure.");
    } else {
        println!("  Run `vaultward migrate` to encrypt the remaining plaintext.");
    }
    println!();
}

/// One row of the status table.
fn status_line(name: &str, secure: bool, detail: &str, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        if secure {
            format!("    {} {:<10} {}", "✓".green(), name, detail)
        } else {
            format!("    {} {:<10} {}", "✗".red(), name, detail.red())
        }
    } else if secure {
        format!("    [OK]   {name:<10} {detail}")
    } else {
        format!("    [TODO] {name:<10} {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_status_line_marks_pending_domains() {
        assert_eq!(
            status_line("Files", false, "1 of 2 file(s) still plaintext", false),
            "    [TODO] Files      1 of 2 file(s) still plaintext"
        );
        assert_eq!(
            status_line("Passwords", true, "no plaintext password file", false),
            "    [OK]   Passwords  no plaintext password file"
        );
    }

    #[test]
    fn assessment_lines_follow_domain_order() {
        let lines = assessment_lines(&MigrationAssessment::new(true, false, true));
        assert_eq!(
            lines,
            vec![
                "passwords: needs migration",
                "files:     secure",
                "metadata:  needs migration",
            ]
        );
    }

    #[test]
    fn status_serializes_for_json_output() {
        let status = MigrationStatus::new(
            MigrationAssessment::new(false, false, false),
            "no plaintext password file".to_string(),
            "no file storage directory".to_string(),
            "no metadata catalog".to_string(),
        );
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["is_fully_secure"], true);
        assert_eq!(json["assessment"]["needs_any_migration"], false);
    }
}
