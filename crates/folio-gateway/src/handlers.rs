// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the blog REST API.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use folio_blog::{QueryState, ReactionSummary, parse_kind};
use folio_core::{
    CategoryOption, ContentId, ContentItem, Field, FolioError, HealthStatus, Language,
    SessionResolver, ToggleOutcome, Tone, resolve,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query parameters for GET /v1/posts.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Kept as text so a malformed value maps to a JSON 400.
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// Query parameters carrying only a language.
#[derive(Debug, Default, Deserialize)]
pub struct LangParams {
    #[serde(default)]
    pub lang: Option<String>,
}

/// A post with every text field resolved for one language.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: ContentId,
    pub title: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub category: String,
    pub author: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub published_at: DateTime<Utc>,
    pub tone: Tone,
    pub featured: bool,
}

impl PostView {
    fn summary(item: &ContentItem, language: Language) -> Self {
        Self {
            id: item.id.clone(),
            title: resolve(item, Field::Title, language),
            excerpt: resolve(item, Field::Excerpt, language),
            body: None,
            category: resolve(item, Field::Category, language),
            author: item.author.clone(),
            tags: item.tags.clone(),
            read_time: item.read_time.clone(),
            published_at: item.published_at,
            tone: item.tone,
            featured: item.featured,
        }
    }

    fn full(item: &ContentItem, language: Language) -> Self {
        Self {
            body: Some(resolve(item, Field::Body, language)),
            ..Self::summary(item, language)
        }
    }
}

/// Response body for GET /v1/posts.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub items: Vec<PostView>,
    pub featured: Option<PostView>,
    pub total_count: u64,
    pub total_pages: u32,
    pub page: u32,
    pub page_size: u32,
    pub language: Language,
    pub degraded: bool,
}

/// Response body for GET /v1/categories.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryOption>,
    pub degraded: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
}

fn language_of(lang: Option<&str>, fallback: Language) -> Language {
    lang.map(Language::from_code_lossy).unwrap_or(fallback)
}

fn parse_page(raw: Option<&str>) -> Result<Option<u32>, FolioError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| FolioError::InvalidInput(format!("invalid page number: {value}"))),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match &state.backend {
        None => "healthy".to_string(),
        Some(backend) => match backend.health_check().await {
            Ok(HealthStatus::Healthy) => "healthy".to_string(),
            Ok(HealthStatus::Degraded(msg)) => format!("degraded: {msg}"),
            Ok(HealthStatus::Unhealthy(msg)) => format!("unhealthy: {msg}"),
            Err(e) => format!("unhealthy: {e}"),
        },
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.engine.source_name().to_string(),
    })
}

/// GET /v1/posts
pub async fn list_posts(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListingResponse>, ApiError> {
    let page = parse_page(params.page.as_deref())?;
    let language = language_of(params.lang.as_deref(), state.default_language);
    let query = QueryState::from_parts(params.search.as_deref(), params.category.as_deref(), page);

    let fetched = state.engine.listing(&query, language).await;
    let degraded = fetched.is_degraded();
    let listing = fetched.value;
    debug!(page = listing.page, total = listing.total_count, degraded, "listing served");

    Ok(Json(ListingResponse {
        items: listing
            .items
            .iter()
            .map(|item| PostView::summary(item, language))
            .collect(),
        featured: listing
            .featured
            .as_ref()
            .map(|item| PostView::summary(item, language)),
        total_count: listing.total_count,
        total_pages: listing.total_pages,
        page: listing.page,
        page_size: state.engine.page_size(),
        language,
        degraded,
    }))
}

/// GET /v1/posts/{id}
pub async fn get_post(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> Result<Json<PostView>, ApiError> {
    let language = language_of(params.lang.as_deref(), state.default_language);
    let item = state.engine.post(&ContentId(id)).await?;
    Ok(Json(PostView::full(&item, language)))
}

/// GET /v1/categories
pub async fn list_categories(
    State(state): State<GatewayState>,
    Query(params): Query<LangParams>,
) -> Json<CategoriesResponse> {
    let fetched = state
        .engine
        .categories(language_of(params.lang.as_deref(), state.default_language))
        .await;
    Json(CategoriesResponse {
        degraded: fetched.is_degraded(),
        categories: fetched.value,
    })
}

/// GET /v1/posts/{id}/reactions
pub async fn get_reactions(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<ReactionSummary> {
    let session = state.sessions.resolve_session(&headers);
    Json(
        state
            .reactions
            .reaction_summary(&session, &ContentId(id))
            .await,
    )
}

/// POST /v1/posts/{id}/reactions/{kind}
pub async fn toggle_reaction(
    State(state): State<GatewayState>,
    Path((id, kind)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ToggleOutcome>, ApiError> {
    let kind = parse_kind(&kind)?;
    let session = state.sessions.resolve_session(&headers);
    let outcome = state
        .reactions
        .toggle_reaction(&session, &ContentId(id), kind)
        .await?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_parsing() {
        assert_eq!(parse_page(None).unwrap(), None);
        assert_eq!(parse_page(Some(" ")).unwrap(), None);
        assert_eq!(parse_page(Some("3")).unwrap(), Some(3));
        assert!(matches!(
            parse_page(Some("-1")),
            Err(FolioError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_language_uses_primary() {
        assert_eq!(language_of(Some("RU"), Language::En), Language::Ru);
        assert_eq!(language_of(Some("fr"), Language::Ru), Language::En);
        assert_eq!(language_of(None, Language::Ru), Language::Ru);
    }
}
