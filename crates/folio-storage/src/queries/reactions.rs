// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction record operations.

use folio_core::{ContentId, FolioError, ReactionId, ReactionKind, ReactionRecord, UserId};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use crate::database::Database;
use crate::queries::{conversion_error, is_constraint_violation, is_permission_denied};

/// Outcome of the insert transaction, classified before leaving the
/// connection thread.
enum InsertResult {
    Inserted(Option<ReactionKind>),
    MissingContent,
    Duplicate,
    Denied(String),
}

/// All records for an item, oldest first.
pub async fn list_reactions(
    db: &Database,
    content_id: &ContentId,
) -> Result<Vec<ReactionRecord>, FolioError> {
    let key = content_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content_id, user_id, kind FROM reactions
                 WHERE content_id = ?1 ORDER BY created_at, id",
            )?;
            let rows = stmt
                .query_map(params![key], |row| {
                    let kind: String = row.get(3)?;
                    Ok(ReactionRecord {
                        id: ReactionId(row.get(0)?),
                        content_id: ContentId(row.get(1)?),
                        user_id: UserId(row.get(2)?),
                        kind: kind.parse().map_err(|e| conversion_error(3, e))?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record id for an exact (content, user, kind) triple.
pub async fn find_reaction(
    db: &Database,
    content_id: &ContentId,
    user_id: &UserId,
    kind: ReactionKind,
) -> Result<Option<ReactionId>, FolioError> {
    let content = content_id.0.clone();
    let user = user_id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id FROM reactions WHERE content_id = ?1 AND user_id = ?2 AND kind = ?3",
                params![content, user, kind.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
        .map(|id| id.map(ReactionId))
}

/// Insert a record in one transaction.
///
/// With `exclusive_polarity`, an existing opposite-polarity record held by
/// the same user is deleted first and reported back as displaced.
pub async fn insert_reaction(
    db: &Database,
    content_id: &ContentId,
    user_id: &UserId,
    kind: ReactionKind,
    exclusive_polarity: bool,
) -> Result<Option<ReactionKind>, FolioError> {
    let content = content_id.0.clone();
    let user = user_id.0.clone();
    let id = uuid::Uuid::new_v4().to_string();

    let result = db
        .connection()
        .call(move |conn| {
            // Reads then writes: take the write lock up front so a concurrent
            // writer is waited out through busy_timeout.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM content_items WHERE id = ?1 AND published = 1)",
                params![content],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(InsertResult::MissingContent);
            }

            let mut displaced = None;
            if exclusive_polarity {
                if let Some(opposite) = kind.opposite() {
                    let removed = tx.execute(
                        "DELETE FROM reactions WHERE content_id = ?1 AND user_id = ?2 AND kind = ?3",
                        params![content, user, opposite.as_str()],
                    )?;
                    if removed > 0 {
                        displaced = Some(opposite);
                    }
                }
            }

            // Dropping `tx` on the early returns rolls back the displacement.
            match tx.execute(
                "INSERT INTO reactions (id, content_id, user_id, kind) VALUES (?1, ?2, ?3, ?4)",
                params![id, content, user, kind.as_str()],
            ) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Ok(InsertResult::Duplicate),
                Err(e) if is_permission_denied(&e) => {
                    return Ok(InsertResult::Denied(e.to_string()));
                }
                Err(e) => return Err(e),
            }
            tx.commit()?;
            Ok(InsertResult::Inserted(displaced))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match result {
        InsertResult::Inserted(displaced) => Ok(displaced),
        InsertResult::MissingContent => Err(FolioError::NotFound {
            entity: "content",
            id: content_id.0.clone(),
        }),
        InsertResult::Duplicate => Err(FolioError::ConstraintViolation {
            message: format!("{} already holds {kind} on {content_id}", user_id),
        }),
        InsertResult::Denied(message) => Err(FolioError::PermissionDenied { message }),
    }
}

/// Delete a record by id.
pub async fn delete_reaction(db: &Database, id: &ReactionId) -> Result<(), FolioError> {
    let key = id.0.clone();
    let affected = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM reactions WHERE id = ?1", params![key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if affected == 0 {
        return Err(FolioError::NotFound {
            entity: "reaction",
            id: id.0.clone(),
        });
    }
    Ok(())
}
