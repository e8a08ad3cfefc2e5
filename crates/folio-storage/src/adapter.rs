// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use folio_config::model::StorageConfig;
use folio_core::{
    BackendAdapter, CategoryOption, ContentFilter, ContentId, ContentItem, ContentPage,
    ContentStore, FolioError, HealthStatus, Language, ReactionId, ReactionKind, ReactionRecord,
    ReactionStore, StorageAdapter, UserId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed content and reaction store.
///
/// The database is lazily opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    exclusive_polarity: bool,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            exclusive_polarity: true,
            db: OnceCell::new(),
        }
    }

    /// Whether adding positive/negative removes the opposite reaction.
    pub fn with_exclusive_polarity(mut self, exclusive: bool) -> Self {
        self.exclusive_polarity = exclusive;
        self
    }

    /// Number of stored content items, including unpublished drafts.
    pub async fn count_content(&self) -> Result<u64, FolioError> {
        queries::content::count_content(self.db()?).await
    }

    fn db(&self) -> Result<&Database, FolioError> {
        self.db
            .get()
            .ok_or_else(|| FolioError::storage_msg("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl BackendAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, FolioError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FolioError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), FolioError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| FolioError::storage_msg("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), FolioError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl ContentStore for SqliteStorage {
    async fn fetch_content_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError> {
        queries::content::list_content_page(self.db()?, filter, page, page_size).await
    }

    async fn fetch_content_by_id(&self, id: &ContentId) -> Result<ContentItem, FolioError> {
        queries::content::get_content(self.db()?, id).await
    }

    async fn fetch_featured(&self) -> Result<Option<ContentItem>, FolioError> {
        queries::content::get_featured(self.db()?).await
    }

    async fn list_categories(
        &self,
        language: Language,
    ) -> Result<Vec<CategoryOption>, FolioError> {
        queries::content::list_categories(self.db()?, language).await
    }

    async fn upsert_content(&self, item: &ContentItem) -> Result<(), FolioError> {
        queries::content::upsert_content(self.db()?, item).await
    }

    async fn delete_content(&self, id: &ContentId) -> Result<(), FolioError> {
        queries::content::delete_content(self.db()?, id).await
    }
}

#[async_trait]
impl ReactionStore for SqliteStorage {
    async fn fetch_reactions(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ReactionRecord>, FolioError> {
        queries::reactions::list_reactions(self.db()?, content_id).await
    }

    async fn find_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionId>, FolioError> {
        queries::reactions::find_reaction(self.db()?, content_id, user_id, kind).await
    }

    async fn insert_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionKind>, FolioError> {
        queries::reactions::insert_reaction(
            self.db()?,
            content_id,
            user_id,
            kind,
            self.exclusive_polarity,
        )
        .await
    }

    async fn delete_reaction(&self, id: &ReactionId) -> Result<(), FolioError> {
        queries::reactions::delete_reaction(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn reports_name_and_version() {
        let storage = SqliteStorage::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let storage = SqliteStorage::new(make_config("never-opened.db"));
        let err = storage
            .fetch_content_by_id(&ContentId::from("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Storage { .. }));
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn trait_objects_share_one_backend() {
        use std::sync::Arc;

        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shared.db");
        let storage = Arc::new(SqliteStorage::new(make_config(db_path.to_str().unwrap())));
        storage.initialize().await.unwrap();

        let content: Arc<dyn ContentStore> = storage.clone();
        let reactions: Arc<dyn ReactionStore> = storage.clone();
        let item = ContentItem {
            id: ContentId::from("p1"),
            title: folio_core::LocalizedText::pair("Guide", ""),
            excerpt: Default::default(),
            body: Default::default(),
            category: folio_core::LocalizedText::plain("Banking"),
            author: String::new(),
            tags: vec![],
            read_time: String::new(),
            published_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            tone: Default::default(),
            featured: true,
            published: true,
        };
        content.upsert_content(&item).await.unwrap();
        reactions
            .insert_reaction(&item.id, &UserId::from("u1"), ReactionKind::Positive)
            .await
            .unwrap();

        assert_eq!(reactions.fetch_reactions(&item.id).await.unwrap().len(), 1);
        assert_eq!(
            content.fetch_featured().await.unwrap().map(|i| i.id),
            Some(item.id.clone())
        );
        assert_eq!(storage.count_content().await.unwrap(), 1);
    }
}
