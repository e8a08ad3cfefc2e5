// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring from configuration to storage, engine and reaction client.

use std::future::Future;
use std::sync::Arc;

use folio_blog::{BlogQueryEngine, ReactionClient, source_for};
use folio_config::FolioConfig;
use folio_core::{FolioError, Language, StorageAdapter};
use folio_storage::SqliteStorage;
use tracing::{info, warn};

/// Open the configured SQLite database.
pub async fn open_storage(config: &FolioConfig) -> Result<Arc<SqliteStorage>, FolioError> {
    let storage = SqliteStorage::new(config.storage.clone())
        .with_exclusive_polarity(config.reactions.exclusive_polarity);
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");
    Ok(Arc::new(storage))
}

/// Run `body` against the configured storage and close it afterwards, on the
/// error path as well, so the WAL is always checkpointed.
pub async fn with_storage<T, F, Fut>(config: &FolioConfig, body: F) -> Result<T, FolioError>
where
    F: FnOnce(Arc<SqliteStorage>) -> Fut,
    Fut: Future<Output = Result<T, FolioError>>,
{
    let storage = open_storage(config).await?;
    let result = body(storage.clone()).await;
    let closed = storage.close().await;
    match result {
        Ok(value) => closed.map(|()| value),
        Err(e) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "storage close failed");
            }
            Err(e)
        }
    }
}

/// Build the query engine over the configured listing backend.
pub async fn build_engine(
    config: &FolioConfig,
    storage: Arc<SqliteStorage>,
) -> Result<BlogQueryEngine, FolioError> {
    let source = source_for(config.blog.source, storage).await?;
    Ok(BlogQueryEngine::from_config(source, &config.blog))
}

pub fn build_reactions(config: &FolioConfig, storage: Arc<SqliteStorage>) -> ReactionClient {
    ReactionClient::new(storage, config.blog.request_timeout())
}

/// The site's default language; validation has already rejected bad codes.
pub fn default_language(config: &FolioConfig) -> Language {
    Language::from_code_lossy(&config.site.default_language)
}
