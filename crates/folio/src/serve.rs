// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `folio serve`: run the HTTP gateway until a shutdown signal arrives.

use std::sync::Arc;

use folio_config::FolioConfig;
use folio_core::{BackendAdapter, FolioError, StorageAdapter};
use folio_gateway::{GatewayState, HeaderSessionResolver, start_server};
use tracing::{info, warn};

use crate::app;
use crate::shutdown;

pub async fn run_serve(config: FolioConfig) -> Result<(), FolioError> {
    let storage = app::open_storage(&config).await?;
    let engine = app::build_engine(&config, storage.clone()).await?;
    let reactions = app::build_reactions(&config, storage.clone());
    info!(
        site = %config.site.name,
        source = engine.source_name(),
        page_size = engine.page_size(),
        "blog engine ready"
    );

    let backend: Arc<dyn BackendAdapter> = storage.clone();
    let state = GatewayState {
        engine: Arc::new(engine),
        reactions: Arc::new(reactions),
        sessions: Arc::new(HeaderSessionResolver),
        default_language: app::default_language(&config),
        backend: Some(backend),
    };

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.gateway, state, async move {
        cancel.cancelled().await;
    })
    .await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    served
}
