// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the collaborators and the migration engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One of the three independently migrated categories of vault data.
///
/// The derived ordering is the migration order: passwords, then files, then
/// metadata.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Passwords,
    Files,
    Metadata,
}

impl Domain {
    /// All domains in migration order.
    pub const ALL: [Domain; 3] = [Domain::Passwords, Domain::Files, Domain::Metadata];

    /// The human-readable label used in migration logs and summary messages.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Passwords => "Password Migration",
            Domain::Files => "File Migration",
            Domain::Metadata => "Metadata Migration",
        }
    }
}

/// Role of a vault credential. The legacy password artifact lists them in
/// exactly this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CredentialRole {
    Master,
    Decoy,
    Panic,
}

impl CredentialRole {
    /// Roles in legacy artifact order.
    pub const ORDERED: [CredentialRole; 3] = [
        CredentialRole::Master,
        CredentialRole::Decoy,
        CredentialRole::Panic,
    ];
}

/// A file descriptor record from the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Name of the stored file inside the vault's file directory.
    pub file_name: String,
    /// Name of the file as uploaded by the user, if different.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Plaintext size in bytes.
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// RFC 3339 upload timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}
