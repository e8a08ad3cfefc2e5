// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `folio posts`: print a listing page from the command line.

use folio_blog::{Listing, QueryState};
use folio_config::FolioConfig;
use folio_core::{ContentItem, Field, FolioError, Language, resolve};
use serde_json::json;
use tracing::warn;

use crate::app;

pub struct PostsArgs {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: u32,
    pub lang: Option<String>,
}

pub async fn run_posts(config: &FolioConfig, args: PostsArgs) -> Result<(), FolioError> {
    let language = args
        .lang
        .as_deref()
        .map(Language::from_code_lossy)
        .unwrap_or_else(|| app::default_language(config));
    let state = QueryState::from_parts(
        args.search.as_deref(),
        args.category.as_deref(),
        Some(args.page),
    );
    let value = app::with_storage(config, |storage| async move {
        let engine = app::build_engine(config, storage).await?;
        let fetched = engine.listing(&state, language).await;
        if let Some(e) = &fetched.error {
            warn!(error = %e, "listing degraded");
        }
        Ok(render_listing(&fetched.value, language, fetched.error.is_some()))
    })
    .await?;
    let rendered = serde_json::to_string_pretty(&value)
        .map_err(|e| FolioError::Internal(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn render_listing(listing: &Listing, language: Language, degraded: bool) -> serde_json::Value {
    let summary = |item: &ContentItem| {
        json!({
            "id": item.id,
            "title": resolve(item, Field::Title, language),
            "category": resolve(item, Field::Category, language),
            "published_at": item.published_at,
        })
    };
    json!({
        "featured": listing.featured.as_ref().map(summary),
        "items": listing.items.iter().map(summary).collect::<Vec<_>>(),
        "page": listing.page,
        "total_pages": listing.total_pages,
        "total_count": listing.total_count,
        "degraded": degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{ContentId, LocalizedText};

    #[test]
    fn listing_renders_resolved_text() {
        let item = ContentItem {
            id: ContentId::from("eu"),
            title: LocalizedText::pair("EU accounts", ""),
            excerpt: LocalizedText::default(),
            body: LocalizedText::default(),
            category: LocalizedText::pair("Banking", "Банкинг"),
            author: String::new(),
            tags: vec![],
            read_time: String::new(),
            published_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            tone: Default::default(),
            featured: false,
            published: true,
        };
        let listing = Listing {
            items: vec![item],
            featured: None,
            total_count: 1,
            total_pages: 1,
            page: 1,
        };
        let value = render_listing(&listing, Language::Ru, false);
        assert_eq!(value["items"][0]["title"], "EU accounts");
        assert_eq!(value["items"][0]["category"], "Банкинг");
        assert!(value["featured"].is_null());
    }
}
