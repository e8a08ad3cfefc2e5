// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Folio content core.

use thiserror::Error;

/// The primary error type used across Folio store traits and core operations.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No acting user could be resolved from the session.
    #[error("acting user identity is unavailable")]
    IdentityUnavailable,

    /// The store's access-control layer rejected the operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint rejected an insert.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Malformed caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FolioError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FolioError::Storage {
            source: Box::new(err),
        }
    }

    /// Storage failure carrying only a message.
    pub fn storage_msg(message: impl Into<String>) -> Self {
        FolioError::Storage {
            source: message.into().into(),
        }
    }

    /// Whether the error is a missing-entity outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FolioError::NotFound { .. })
    }
}
