// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit sinks for migration and rollback events.

use std::sync::Mutex;

use tracing::info;
use vaultward_core::AuditSink;

/// Forwards every event to `tracing` on the `vaultward::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &str) {
        info!(target: "vaultward::audit", "{event}");
    }
}

/// Keeps events in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<String>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &str) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.to_string());
    }
}
