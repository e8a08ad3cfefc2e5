// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::future::Future;
use std::time::Duration;

use folio_core::FolioError;
use tracing::warn;

/// Run a store call under `limit`, mapping expiry to `FolioError::Timeout`.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> Result<T, FolioError>
where
    F: Future<Output = Result<T, FolioError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_elapsed) => {
            warn!(operation, timeout_secs = limit.as_secs(), "store call timed out");
            Err(FolioError::Timeout { duration: limit })
        }
    }
}
