// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blog listing assembly: featured spotlight, filtered page, page math.

use std::sync::Arc;
use std::time::Duration;

use folio_config::model::BlogConfig;
use folio_core::query::total_pages;
use folio_core::{
    CategoryOption, ContentFilter, ContentId, ContentItem, Fetched, FolioError, Language,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::deadline::bounded;
use crate::source::ContentSource;
use crate::state::QueryState;

/// One rendered listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    pub items: Vec<ContentItem>,
    /// Spotlighted post shown above the grid.
    pub featured: Option<ContentItem>,
    pub total_count: u64,
    pub total_pages: u32,
    pub page: u32,
}

#[derive(Clone)]
pub struct BlogQueryEngine {
    source: Arc<dyn ContentSource>,
    page_size: u32,
    timeout: Duration,
}

impl BlogQueryEngine {
    pub fn new(source: Arc<dyn ContentSource>, page_size: u32, timeout: Duration) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            timeout,
        }
    }

    pub fn from_config(source: Arc<dyn ContentSource>, config: &BlogConfig) -> Self {
        Self::new(source, config.page_size, config.request_timeout())
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Assemble the listing for `state`.
    ///
    /// The featured post is always returned when one exists, but it is
    /// removed from the grid only while no search or category filter is
    /// active. Failures yield an empty listing carrying the error.
    pub async fn listing(&self, state: &QueryState, language: Language) -> Fetched<Listing> {
        let page = state.page.max(1);
        let result = self.try_listing(state, language, page).await;
        match result {
            Ok(listing) => Fetched::ok(listing),
            Err(e) => {
                warn!(error = %e, search = %state.search, category = %state.category, "listing degraded");
                Fetched::degraded(
                    Listing {
                        page,
                        ..Listing::default()
                    },
                    e,
                )
            }
        }
    }

    async fn try_listing(
        &self,
        state: &QueryState,
        language: Language,
        page: u32,
    ) -> Result<Listing, FolioError> {
        let mut filter = ContentFilter::new(state.search.as_str(), state.category.as_str(), language);
        let featured = bounded(self.timeout, "featured", self.source.featured()).await?;
        if !filter.is_active() {
            filter.exclude = featured.as_ref().map(|item| item.id.clone());
        }

        let content = bounded(
            self.timeout,
            "fetch_page",
            self.source.fetch_page(&filter, page, self.page_size),
        )
        .await?;
        debug!(
            source = self.source.name(),
            page,
            returned = content.items.len(),
            total = content.total_count,
            "listing fetched"
        );

        Ok(Listing {
            total_pages: total_pages(content.total_count, self.page_size),
            total_count: content.total_count,
            items: content.items,
            featured,
            page,
        })
    }

    /// Category filter options, `all` first; just `all` on failure.
    pub async fn categories(&self, language: Language) -> Fetched<Vec<CategoryOption>> {
        match bounded(self.timeout, "categories", self.source.categories(language)).await {
            Ok(categories) => Fetched::ok(categories),
            Err(e) => {
                warn!(error = %e, "categories degraded");
                Fetched::degraded(vec![CategoryOption::all()], e)
            }
        }
    }

    /// A single published post.
    pub async fn post(&self, id: &ContentId) -> Result<ContentItem, FolioError> {
        bounded(self.timeout, "item", self.source.item(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use folio_core::{LocalizedText, Tone};

    fn post(id: &str, title: &str, category: &str, day: u32, featured: bool) -> ContentItem {
        ContentItem {
            id: ContentId::from(id),
            title: LocalizedText::pair(title, ""),
            excerpt: LocalizedText::default(),
            body: LocalizedText::default(),
            category: LocalizedText::plain(category),
            author: String::new(),
            tags: vec![],
            read_time: String::new(),
            published_at: format!("2026-01-{day:02}T00:00:00Z").parse().unwrap(),
            tone: Tone::Blue,
            featured,
            published: true,
        }
    }

    fn engine(items: Vec<ContentItem>) -> BlogQueryEngine {
        BlogQueryEngine::new(
            Arc::new(MemorySource::new(items)),
            8,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn featured_is_hidden_from_unfiltered_grid() {
        let engine = engine(vec![
            post("a", "Banking Options", "Banking", 1, false),
            post("b", "Offshore Registration", "Company Registration", 2, true),
        ]);
        let listing = engine.listing(&QueryState::default(), Language::En).await;
        assert!(!listing.is_degraded());
        let listing = listing.value;
        assert_eq!(listing.featured.as_ref().unwrap().id.as_str(), "b");
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.total_count, 1);
    }

    #[tokio::test]
    async fn featured_stays_in_filtered_grid() {
        let engine = engine(vec![
            post("a", "Banking Options", "Banking", 1, false),
            post("b", "Offshore Registration", "Company Registration", 2, true),
        ]);
        let state = QueryState::from_parts(None, Some("company registration"), None);
        let listing = engine.listing(&state, Language::En).await.value;
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].id.as_str(), "b");
        assert!(listing.featured.is_some());
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_with_true_total() {
        let items = (1..=10)
            .map(|day| post(&format!("p{day}"), "Tax", "Tax", day, false))
            .collect();
        let engine = engine(items);
        let state = QueryState::from_parts(None, None, Some(4));
        let listing = engine.listing(&state, Language::En).await.value;
        assert!(listing.items.is_empty());
        assert_eq!(listing.total_count, 10);
        assert_eq!(listing.total_pages, 2);
        assert_eq!(listing.page, 4);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let engine = engine(vec![]);
        assert!(engine
            .post(&ContentId::from("nope"))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
