// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interchangeable listing backends.
//!
//! [`RemoteSource`] lets the store filter and paginate. [`MemorySource`]
//! holds every published item and applies the same rules locally, so the
//! two must return identical pages for identical inputs.

use std::sync::Arc;

use async_trait::async_trait;
use folio_config::model::ContentSourceKind;
use folio_core::query::{distinct_categories, paginate, select_featured};
use folio_core::{
    CategoryOption, ContentFilter, ContentId, ContentItem, ContentPage, ContentStore, FolioError,
    Language,
};
use tracing::debug;

/// Read side of the blog used by the query engine.
#[async_trait]
pub trait ContentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError>;

    async fn featured(&self) -> Result<Option<ContentItem>, FolioError>;

    async fn categories(&self, language: Language) -> Result<Vec<CategoryOption>, FolioError>;

    async fn item(&self, id: &ContentId) -> Result<ContentItem, FolioError>;
}

/// Server-side filtering and pagination through a [`ContentStore`].
pub struct RemoteSource {
    store: Arc<dyn ContentStore>,
}

impl RemoteSource {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ContentSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError> {
        self.store.fetch_content_page(filter, page, page_size).await
    }

    async fn featured(&self) -> Result<Option<ContentItem>, FolioError> {
        self.store.fetch_featured().await
    }

    async fn categories(&self, language: Language) -> Result<Vec<CategoryOption>, FolioError> {
        self.store.list_categories(language).await
    }

    async fn item(&self, id: &ContentId) -> Result<ContentItem, FolioError> {
        self.store.fetch_content_by_id(id).await
    }
}

/// Fully loaded item set filtered and paginated in process.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: Vec<ContentItem>,
}

/// Page size used when draining a store into memory.
const LOAD_BATCH: u32 = 100;

impl MemorySource {
    /// Keep the published subset of `items`.
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items: items.into_iter().filter(|i| i.published).collect(),
        }
    }

    /// Read every published item out of `store`.
    pub async fn load(store: &dyn ContentStore) -> Result<Self, FolioError> {
        let filter = ContentFilter::default();
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let batch = store.fetch_content_page(&filter, page, LOAD_BATCH).await?;
            let exhausted = batch.items.len() < LOAD_BATCH as usize;
            items.extend(batch.items);
            if exhausted || items.len() as u64 >= batch.total_count {
                break;
            }
            page += 1;
        }
        debug!(count = items.len(), "loaded content into memory");
        Ok(Self::new(items))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError> {
        Ok(paginate(&self.items, filter, page, page_size))
    }

    async fn featured(&self) -> Result<Option<ContentItem>, FolioError> {
        Ok(select_featured(&self.items).cloned())
    }

    async fn categories(&self, language: Language) -> Result<Vec<CategoryOption>, FolioError> {
        Ok(distinct_categories(&self.items, language))
    }

    async fn item(&self, id: &ContentId) -> Result<ContentItem, FolioError> {
        self.items
            .iter()
            .find(|i| &i.id == id)
            .cloned()
            .ok_or_else(|| FolioError::NotFound {
                entity: "content",
                id: id.0.clone(),
            })
    }
}

/// Build the listing backend selected by configuration.
///
/// The memory backend snapshots the store once; later writes are not seen.
pub async fn source_for(
    kind: ContentSourceKind,
    store: Arc<dyn ContentStore>,
) -> Result<Arc<dyn ContentSource>, FolioError> {
    match kind {
        ContentSourceKind::Remote => Ok(Arc::new(RemoteSource::new(store))),
        ContentSourceKind::Memory => Ok(Arc::new(MemorySource::load(store.as_ref()).await?)),
    }
}
