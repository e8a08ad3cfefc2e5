// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read side of the remote content store.

use async_trait::async_trait;

use crate::error::FolioError;
use crate::query::{CategoryOption, ContentFilter, ContentPage};
use crate::types::{ContentId, ContentItem, Language};

/// Paginated, filterable access to published content items.
///
/// Implementations must follow the matching, ordering and tie-break rules
/// in [`crate::query`] so that backends stay interchangeable.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch one 1-based page of published items matching `filter`.
    async fn fetch_content_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError>;

    /// Fetch a published item by id; `NotFound` when missing or unpublished.
    async fn fetch_content_by_id(&self, id: &ContentId) -> Result<ContentItem, FolioError>;

    /// The spotlighted featured item, if any item is flagged featured.
    async fn fetch_featured(&self) -> Result<Option<ContentItem>, FolioError>;

    /// Distinct categories across all published items, `all` first.
    async fn list_categories(&self, language: Language)
    -> Result<Vec<CategoryOption>, FolioError>;

    /// Insert or replace an item.
    async fn upsert_content(&self, item: &ContentItem) -> Result<(), FolioError>;

    /// Delete an item together with its reactions.
    async fn delete_content(&self, id: &ContentId) -> Result<(), FolioError>;
}
