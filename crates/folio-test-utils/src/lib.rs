// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Folio integration tests.
//!
//! # Components
//!
//! - [`InMemoryStore`] - content and reaction store with failure injection
//! - [`TestHarness`] - temp SQLite storage wired to the engine and reaction client
//! - [`fixtures`] - bilingual sample posts

pub mod fixtures;
pub mod harness;
pub mod memory_store;

pub use harness::TestHarness;
pub use memory_store::{Failure, InMemoryStore};
