// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit sink for migration and rollback events.

/// Receives human-readable audit events.
///
/// Recording is fire-and-forget: the signature is infallible, so a broken
/// sink can never fail a migration. Implementations must swallow their own
/// errors.
pub trait AuditSink: Send + Sync {
    /// Record a single audit event.
    fn record(&self, event: &str);
}
