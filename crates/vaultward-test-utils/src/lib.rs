// SPDX-FileCopyrightText: 2026 Vaultward Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vaultward integration tests.
//!
//! Provides a harness that materialises legacy vaults in temp directories and
//! in-memory or failure-injecting collaborators, so engine tests run fast and
//! deterministically.
//!
//! # Components
//!
//! - [`TestHarness`] - temp vault plus a fully wired orchestrator
//! - [`mocks`] - in-memory and failing credential, file, and catalog stores

pub mod harness;
pub mod mocks;

pub use harness::{FAST_KDF, TestHarness};
