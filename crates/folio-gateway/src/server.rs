// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use axum::{
    Router,
    routing::{get, post},
};
use folio_blog::{BlogQueryEngine, ReactionClient};
use folio_config::model::GatewayConfig;
use folio_core::{BackendAdapter, FolioError, Language, SessionResolver};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::session::VISITOR_HEADER;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<BlogQueryEngine>,
    pub reactions: Arc<ReactionClient>,
    pub sessions: Arc<dyn SessionResolver<HeaderMap>>,
    /// Language used when a request carries no `lang` parameter.
    pub default_language: Language,
    /// Storage backend probed by `/health`, if any.
    pub backend: Option<Arc<dyn BackendAdapter>>,
}

fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(VISITOR_HEADER)])
}

/// Build the application router.
///
/// - GET /health
/// - GET /v1/posts, GET /v1/posts/{id}
/// - GET /v1/categories
/// - GET /v1/posts/{id}/reactions, POST /v1/posts/{id}/reactions/{kind}
pub fn build_router(state: GatewayState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/posts", get(handlers::list_posts))
        .route("/v1/posts/{id}", get(handlers::get_post))
        .route("/v1/categories", get(handlers::list_categories))
        .route("/v1/posts/{id}/reactions", get(handlers::get_reactions))
        .route(
            "/v1/posts/{id}/reactions/{kind}",
            post(handlers::toggle_reaction),
        )
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server<F>(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), FolioError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FolioError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| FolioError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
