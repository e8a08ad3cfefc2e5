// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction persistence.

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::{ContentId, ReactionId, ReactionKind, ReactionRecord, UserId};

/// Storage of (content, user, kind) reaction records.
///
/// The backend must enforce uniqueness of the triple; the reaction client
/// relies on it instead of serializing toggles itself.
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// All reaction records attached to an item.
    async fn fetch_reactions(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ReactionRecord>, FolioError>;

    /// The record id for an exact triple, if present.
    async fn find_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionId>, FolioError>;

    /// Insert a record.
    ///
    /// Returns the opposite-polarity kind removed in the same write, if the
    /// store enforces exclusive polarity. Fails with `ConstraintViolation`
    /// when the triple already exists and `PermissionDenied` when the store
    /// refuses the write.
    async fn insert_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionKind>, FolioError>;

    /// Delete a record by id; `NotFound` when it no longer exists.
    async fn delete_reaction(&self, id: &ReactionId) -> Result<(), FolioError>;
}
