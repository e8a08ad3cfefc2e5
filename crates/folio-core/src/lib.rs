// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Folio content service.
//!
//! This crate provides the content and reaction data model, the error
//! taxonomy, the store traits every backend implements, and the localized
//! content resolver. Nothing here performs I/O.

pub mod error;
pub mod localize;
pub mod query;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FolioError;
pub use localize::{resolve, resolve_named, resolve_text};
pub use query::{ALL_CATEGORIES, CategoryOption, ContentFilter, ContentPage};
pub use types::{
    ContentId, ContentItem, Fetched, Field, HealthStatus, Language, LocalizedText, ReactionCounts,
    ReactionId, ReactionKind, ReactionRecord, Session, ToggleAction, ToggleOutcome, Tone, UserId,
    UserReactions,
};

pub use traits::{BackendAdapter, ContentStore, ReactionStore, SessionResolver, StorageAdapter};
