// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./folio.toml` > `~/.config/folio/folio.toml` > `/etc/folio/folio.toml`
//! with environment variable overrides via `FOLIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FolioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/folio/folio.toml` (system-wide)
/// 3. `~/.config/folio/folio.toml` (user XDG config)
/// 4. `./folio.toml` (local directory)
/// 5. `FOLIO_*` environment variables
pub fn load_config() -> Result<FolioConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FolioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FolioConfig::default()))
        .merge(Toml::file("/etc/folio/folio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("folio/folio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("folio.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `FOLIO_BLOG_PAGE_SIZE` must map to `blog.page_size`,
/// not `blog.page.size`.
fn env_provider() -> Env {
    Env::prefixed("FOLIO_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("site_", "site.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("blog_", "blog.", 1)
            .replacen("reactions_", "reactions.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
