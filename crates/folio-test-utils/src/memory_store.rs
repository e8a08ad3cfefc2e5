// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of both store traits.
//!
//! Follows the same rules as the SQLite backend (uniqueness per triple,
//! optional polarity exclusivity, published-only reads) and lets tests
//! inject failures and latency.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_core::query::{distinct_categories, paginate, select_featured};
use folio_core::{
    CategoryOption, ContentFilter, ContentId, ContentItem, ContentPage, ContentStore, FolioError,
    Language, ReactionId, ReactionKind, ReactionRecord, ReactionStore, UserId,
};
use tokio::sync::Mutex;

/// Failure returned by the next store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Storage,
    PermissionDenied,
}

impl Failure {
    fn into_error(self) -> FolioError {
        match self {
            Failure::Storage => FolioError::storage_msg("injected storage failure"),
            Failure::PermissionDenied => FolioError::PermissionDenied {
                message: "injected permission failure".into(),
            },
        }
    }
}

#[derive(Default)]
struct State {
    items: BTreeMap<ContentId, ContentItem>,
    reactions: Vec<ReactionRecord>,
    next_reaction: u64,
    pending_failure: Option<Failure>,
    offline: bool,
    delay: Option<Duration>,
    calls: usize,
}

/// Thread-safe in-memory store.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    exclusive_polarity: bool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            exclusive_polarity: true,
        }
    }

    /// Store pre-populated with `items`.
    pub async fn with_items(items: Vec<ContentItem>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().await;
            for item in items {
                state.items.insert(item.id.clone(), item);
            }
        }
        store
    }

    pub fn with_exclusive_polarity(mut self, exclusive: bool) -> Self {
        self.exclusive_polarity = exclusive;
        self
    }

    /// Make the next call fail once.
    pub async fn fail_next(&self, failure: Failure) {
        self.state.lock().await.pending_failure = Some(failure);
    }

    /// Fail every call with a storage error until switched back.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Sleep this long before answering each call.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().await.delay = delay;
    }

    /// Number of store calls served so far.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.calls
    }

    /// Snapshot of every stored reaction record.
    pub async fn reactions(&self) -> Vec<ReactionRecord> {
        self.state.lock().await.reactions.clone()
    }

    /// Count the call, then apply injected latency and failures.
    async fn enter(&self) -> Result<tokio::sync::MutexGuard<'_, State>, FolioError> {
        let delay = {
            let mut state = self.state.lock().await;
            state.calls += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().await;
        if state.offline {
            return Err(Failure::Storage.into_error());
        }
        if let Some(failure) = state.pending_failure.take() {
            return Err(failure.into_error());
        }
        Ok(state)
    }
}

fn published(state: &State) -> Vec<ContentItem> {
    state.items.values().filter(|i| i.published).cloned().collect()
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn fetch_content_page(
        &self,
        filter: &ContentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<ContentPage, FolioError> {
        let state = self.enter().await?;
        Ok(paginate(&published(&state), filter, page, page_size))
    }

    async fn fetch_content_by_id(&self, id: &ContentId) -> Result<ContentItem, FolioError> {
        let state = self.enter().await?;
        state
            .items
            .get(id)
            .filter(|i| i.published)
            .cloned()
            .ok_or_else(|| FolioError::NotFound {
                entity: "content",
                id: id.0.clone(),
            })
    }

    async fn fetch_featured(&self) -> Result<Option<ContentItem>, FolioError> {
        let state = self.enter().await?;
        Ok(select_featured(state.items.values()).cloned())
    }

    async fn list_categories(
        &self,
        language: Language,
    ) -> Result<Vec<CategoryOption>, FolioError> {
        let state = self.enter().await?;
        Ok(distinct_categories(state.items.values(), language))
    }

    async fn upsert_content(&self, item: &ContentItem) -> Result<(), FolioError> {
        item.validate()?;
        let mut state = self.enter().await?;
        let mut item = item.clone();
        item.normalize_tags();
        state.items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn delete_content(&self, id: &ContentId) -> Result<(), FolioError> {
        let mut state = self.enter().await?;
        if state.items.remove(id).is_none() {
            return Err(FolioError::NotFound {
                entity: "content",
                id: id.0.clone(),
            });
        }
        state.reactions.retain(|r| &r.content_id != id);
        Ok(())
    }
}

#[async_trait]
impl ReactionStore for InMemoryStore {
    async fn fetch_reactions(
        &self,
        content_id: &ContentId,
    ) -> Result<Vec<ReactionRecord>, FolioError> {
        let state = self.enter().await?;
        Ok(state
            .reactions
            .iter()
            .filter(|r| &r.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn find_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionId>, FolioError> {
        let state = self.enter().await?;
        Ok(state
            .reactions
            .iter()
            .find(|r| &r.content_id == content_id && &r.user_id == user_id && r.kind == kind)
            .map(|r| r.id.clone()))
    }

    async fn insert_reaction(
        &self,
        content_id: &ContentId,
        user_id: &UserId,
        kind: ReactionKind,
    ) -> Result<Option<ReactionKind>, FolioError> {
        let mut state = self.enter().await?;
        if !state.items.get(content_id).is_some_and(|i| i.published) {
            return Err(FolioError::NotFound {
                entity: "content",
                id: content_id.0.clone(),
            });
        }
        let holds = |state: &State, kind: ReactionKind| {
            state
                .reactions
                .iter()
                .any(|r| &r.content_id == content_id && &r.user_id == user_id && r.kind == kind)
        };
        if holds(&*state, kind) {
            return Err(FolioError::ConstraintViolation {
                message: format!("{user_id} already holds {kind} on {content_id}"),
            });
        }

        let mut displaced = None;
        if self.exclusive_polarity {
            if let Some(opposite) = kind.opposite() {
                if holds(&*state, opposite) {
                    state.reactions.retain(|r| {
                        !(&r.content_id == content_id && &r.user_id == user_id && r.kind == opposite)
                    });
                    displaced = Some(opposite);
                }
            }
        }

        state.next_reaction += 1;
        let id = ReactionId(format!("mem-{}", state.next_reaction));
        state.reactions.push(ReactionRecord {
            id,
            content_id: content_id.clone(),
            user_id: user_id.clone(),
            kind,
        });
        Ok(displaced)
    }

    async fn delete_reaction(&self, id: &ReactionId) -> Result<(), FolioError> {
        let mut state = self.enter().await?;
        let before = state.reactions.len();
        state.reactions.retain(|r| &r.id != id);
        if state.reactions.len() == before {
            return Err(FolioError::NotFound {
                entity: "reaction",
                id: id.0.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let store = InMemoryStore::with_items(fixtures::registration_and_banking()).await;
        store.fail_next(Failure::PermissionDenied).await;

        let err = store.fetch_featured().await.unwrap_err();
        assert!(matches!(err, FolioError::PermissionDenied { .. }));
        assert!(store.fetch_featured().await.is_ok());
        assert_eq!(store.call_count().await, 2);
    }

    #[tokio::test]
    async fn duplicate_reaction_is_rejected() {
        let store = InMemoryStore::with_items(fixtures::registration_and_banking()).await;
        let id = ContentId::from("banking-options");
        let user = UserId::from("v1");
        store
            .insert_reaction(&id, &user, ReactionKind::Useful)
            .await
            .unwrap();
        let err = store
            .insert_reaction(&id, &user, ReactionKind::Useful)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn opposite_polarity_is_displaced() {
        let store = InMemoryStore::with_items(fixtures::registration_and_banking()).await;
        let id = ContentId::from("banking-options");
        let user = UserId::from("v1");
        store
            .insert_reaction(&id, &user, ReactionKind::Negative)
            .await
            .unwrap();
        let displaced = store
            .insert_reaction(&id, &user, ReactionKind::Positive)
            .await
            .unwrap();
        assert_eq!(displaced, Some(ReactionKind::Negative));
        assert_eq!(store.reactions().await.len(), 1);
    }
}
