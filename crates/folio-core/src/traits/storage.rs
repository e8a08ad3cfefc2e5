// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::FolioError;
use crate::traits::adapter::BackendAdapter;

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the lifecycle of database connections that back
/// the content and reaction stores.
#[async_trait]
pub trait StorageAdapter: BackendAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), FolioError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), FolioError>;
}
