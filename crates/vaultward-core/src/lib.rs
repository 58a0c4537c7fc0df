// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vaultward migration engine.
//!
//! This crate provides the error type, the shared domain types, and the
//! capability traits for the collaborators (credential store, file
//! encryption, metadata store, audit sink) that the engine drives.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ErrorClass, VaultwardError};
pub use types::{CredentialRole, Domain, FileRecord};

pub use traits::{AuditSink, CredentialStore, FileEncryptor, MetadataStore};
