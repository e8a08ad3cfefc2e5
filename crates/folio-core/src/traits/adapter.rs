// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every backend adapter.

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::HealthStatus;

/// The base trait for Folio backend adapters.
///
/// Provides identity, health checking and shutdown for anything that talks
/// to a remote or on-disk store.
#[async_trait]
pub trait BackendAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, FolioError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), FolioError>;
}
