// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` opens a temp SQLite database, seeds it, and wires the
//! query engine and reaction client on top the same way the binary does.

use std::sync::Arc;
use std::time::Duration;

use folio_blog::{BlogQueryEngine, ReactionClient, source_for};
use folio_config::model::{ContentSourceKind, StorageConfig};
use folio_core::{ContentItem, ContentStore, FolioError, StorageAdapter};
use folio_storage::SqliteStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    items: Vec<ContentItem>,
    source: ContentSourceKind,
    page_size: u32,
    timeout: Duration,
    exclusive_polarity: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            source: ContentSourceKind::Remote,
            page_size: 8,
            timeout: Duration::from_secs(5),
            exclusive_polarity: true,
        }
    }

    /// Seed the database with these posts.
    pub fn with_items(mut self, items: Vec<ContentItem>) -> Self {
        self.items = items;
        self
    }

    /// Choose the listing backend.
    pub fn with_source(mut self, source: ContentSourceKind) -> Self {
        self.source = source;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_exclusive_polarity(mut self, exclusive: bool) -> Self {
        self.exclusive_polarity = exclusive;
        self
    }

    /// Build the harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, FolioError> {
        let temp_dir = tempfile::TempDir::new().map_err(FolioError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        })
        .with_exclusive_polarity(self.exclusive_polarity);
        storage.initialize().await?;
        let storage = Arc::new(storage);

        for item in &self.items {
            storage.upsert_content(item).await?;
        }

        let source = source_for(self.source, storage.clone()).await?;
        let engine = BlogQueryEngine::new(source, self.page_size, self.timeout);
        let reactions = ReactionClient::new(storage.clone(), self.timeout);

        Ok(TestHarness {
            storage,
            engine,
            reactions,
            _temp_dir: temp_dir,
        })
    }
}

/// Temp storage plus the engine and reaction client built over it.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    pub engine: BlogQueryEngine,
    pub reactions: ReactionClient,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
