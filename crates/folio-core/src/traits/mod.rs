// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store and adapter trait definitions.
//!
//! Async traits use `#[async_trait]` so they stay usable as trait objects.

pub mod adapter;
pub mod content;
pub mod reaction;
pub mod session;
pub mod storage;

pub use adapter::BackendAdapter;
pub use content::ContentStore;
pub use reaction::ReactionStore;
pub use session::SessionResolver;
pub use storage::StorageAdapter;
