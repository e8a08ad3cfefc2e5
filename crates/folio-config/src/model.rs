// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Folio content service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Folio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FolioConfig {
    /// Site identity and logging.
    #[serde(default)]
    pub site: SiteConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Blog listing settings.
    #[serde(default)]
    pub blog: BlogConfig,

    /// Reaction behavior.
    #[serde(default)]
    pub reactions: ReactionsConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Site identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Display name of the site.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Language used when a request does not name one (`en` or `ru`).
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            default_language: default_language(),
            log_level: default_log_level(),
        }
    }
}

fn default_site_name() -> String {
    "folio".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("folio").join("folio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("folio.db"))
        .to_string_lossy()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Where the blog listing reads its items from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSourceKind {
    /// Server-side filtering and pagination in the store.
    #[default]
    Remote,
    /// Load every published item once and filter in memory.
    Memory,
}

/// Blog listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlogConfig {
    /// Items per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Deadline for a single store round-trip, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Listing backend.
    #[serde(default)]
    pub source: ContentSourceKind,
}

impl BlogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            source: ContentSourceKind::default(),
        }
    }
}

fn default_page_size() -> u32 {
    8
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Reaction behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReactionsConfig {
    /// A positive reaction clears the user's negative one on the same post
    /// and vice versa.
    #[serde(default = "default_exclusive_polarity")]
    pub exclusive_polarity: bool,
}

impl Default for ReactionsConfig {
    fn default() -> Self {
        Self {
            exclusive_polarity: default_exclusive_polarity(),
        }
    }
}

fn default_exclusive_polarity() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}
