// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `folio import`: seed posts from a JSON file.

use std::path::Path;

use folio_config::FolioConfig;
use folio_core::{ContentItem, ContentStore, FolioError};
use tracing::info;

use crate::app;

/// Parse a JSON array of posts and check each one before anything is written.
pub fn parse_items(json: &str) -> Result<Vec<ContentItem>, FolioError> {
    let items: Vec<ContentItem> = serde_json::from_str(json)
        .map_err(|e| FolioError::InvalidInput(format!("invalid import file: {e}")))?;
    let mut seen = std::collections::HashSet::new();
    for item in &items {
        item.validate()?;
        if !seen.insert(item.id.clone()) {
            return Err(FolioError::InvalidInput(format!(
                "duplicate id in import file: {}",
                item.id
            )));
        }
    }
    Ok(items)
}

pub async fn run_import(config: &FolioConfig, file: &Path) -> Result<(), FolioError> {
    let json = std::fs::read_to_string(file)
        .map_err(|e| FolioError::InvalidInput(format!("cannot read {}: {e}", file.display())))?;
    let items = parse_items(&json)?;

    app::with_storage(config, |storage| async move {
        for item in &items {
            storage.upsert_content(item).await?;
        }
        info!(count = items.len(), file = %file.display(), "import complete");
        println!("imported {} posts", items.len());
        Ok(())
    })
    .await
}
