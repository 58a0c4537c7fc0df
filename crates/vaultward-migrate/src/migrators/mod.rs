// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-domain migrators and the outcome value they report.

pub mod file;
pub mod metadata;
pub mod password;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use vaultward_core::{Domain, ErrorClass, VaultwardError};

pub use file::FileMigrator;
pub use metadata::MetadataMigrator;
pub use password::{PasswordMigrator, parse_legacy_passwords};

/// Result of migrating one domain.
///
/// Failures are values: a migrator never returns `Err`, it reports
/// `success = false` with the reason in `log` and `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainOutcome {
    pub domain: Domain,
    pub success: bool,
    /// Short failure reason for the run summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Log lines, each prefixed with the domain label.
    pub log: Vec<String>,
}

impl DomainOutcome {
    pub fn succeeded(domain: Domain, detail: &str) -> Self {
        Self {
            domain,
            success: true,
            reason: None,
            log: vec![format!("{}: succeeded ({detail})", domain.label())],
        }
    }

    pub fn failed(domain: Domain, error: &VaultwardError) -> Self {
        Self::failure(domain, error.class(), error.to_string())
    }

    /// A failure not tied to a single error value.
    pub fn failure(domain: Domain, class: ErrorClass, reason: String) -> Self {
        Self {
            domain,
            success: false,
            log: vec![format!("{}: failed [{class}] {reason}", domain.label())],
            reason: Some(reason),
        }
    }

    /// Prepend detail lines gathered before the final verdict.
    pub fn with_details(mut self, mut details: Vec<String>) -> Self {
        details.append(&mut self.log);
        self.log = details;
        self
    }
}

/// Converts one domain from its legacy form into its secure form.
#[async_trait]
pub trait DomainMigrator: Send + Sync {
    fn domain(&self) -> Domain;

    /// Migrate using `passphrase` as key material.
    async fn migrate(&self, passphrase: &SecretString) -> DomainOutcome;

    /// Read-only description of the domain's current on-disk format.
    fn describe_status(&self) -> String;
}
