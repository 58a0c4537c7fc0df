// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health snapshot of a vault.

use serde::Serialize;

use crate::scanner::MigrationAssessment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub assessment: MigrationAssessment,
    pub password_status: String,
    pub file_encryption_status: String,
    pub metadata_migration_status: String,
    /// True iff no domain needs migration.
    pub is_fully_secure: bool,
}

impl MigrationStatus {
    pub fn new(
        assessment: MigrationAssessment,
        password_status: String,
        file_encryption_status: String,
        metadata_migration_status: String,
    ) -> Self {
        Self {
            is_fully_secure: !assessment.needs_any_migration(),
            assessment,
            password_status,
            file_encryption_status,
            metadata_migration_status,
        }
    }
}
