// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability contracts for the collaborators the migration engine drives.
//!
//! The engine only ever talks to these traits. Concrete implementations live
//! in `vaultward-vault`; mocks live in `vaultward-test-utils`.

pub mod audit;
pub mod catalog;
pub mod credentials;
pub mod files;

pub use audit::AuditSink;
pub use catalog::MetadataStore;
pub use credentials::CredentialStore;
pub use files::FileEncryptor;
