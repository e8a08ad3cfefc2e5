// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reaction toggling and read-side aggregation.
//!
//! Each (item, user, kind) triple is either absent or present, and
//! [`ReactionClient::toggle_reaction`] flips it. The store's uniqueness
//! constraint is the source of truth: an insert that loses a race against a
//! concurrent toggle converges to present, and a delete that finds nothing
//! converges to absent.
//!
//! A write that times out may still reach the store after the caller gave
//! up on it. The client then reads the triple back and reports whichever
//! state the store ended in; if that read fails too, the timeout stands.

use std::sync::Arc;
use std::time::Duration;

use folio_core::{
    ContentId, Fetched, FolioError, ReactionCounts, ReactionKind, ReactionRecord, ReactionStore,
    Session, ToggleAction, ToggleOutcome, UserId, UserReactions,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::deadline::bounded;

/// Parse a wire reaction name (`positive`, `negative`, `useful`).
pub fn parse_kind(value: &str) -> Result<ReactionKind, FolioError> {
    value
        .trim()
        .parse()
        .map_err(|_| FolioError::InvalidInput(format!("unknown reaction kind: {value}")))
}

/// Counts and the acting user's reactions for one item.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionSummary {
    pub content_id: ContentId,
    pub counts: ReactionCounts,
    pub user: UserReactions,
    /// Whether either half fell back to defaults after a store failure.
    pub degraded: bool,
}

/// Client for the reaction half of the store.
#[derive(Clone)]
pub struct ReactionClient {
    store: Arc<dyn ReactionStore>,
    timeout: Duration,
}

impl ReactionClient {
    pub fn new(store: Arc<dyn ReactionStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Flip the acting user's `kind` reaction on `content_id`.
    ///
    /// Fails with `IdentityUnavailable` before touching the store when the
    /// session carries no acting user. `PermissionDenied` and storage errors
    /// propagate unchanged.
    pub async fn toggle_reaction(
        &self,
        session: &Session,
        content_id: &ContentId,
        kind: ReactionKind,
    ) -> Result<ToggleOutcome, FolioError> {
        let user = session
            .acting_user()
            .ok_or(FolioError::IdentityUnavailable)?;

        let existing = bounded(
            self.timeout,
            "find_reaction",
            self.store.find_reaction(content_id, user, kind),
        )
        .await?;

        match existing {
            Some(record_id) => {
                let deleted = bounded(
                    self.timeout,
                    "delete_reaction",
                    self.store.delete_reaction(&record_id),
                )
                .await;
                match deleted {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {
                        warn!(content_id = %content_id, %kind, "reaction already removed");
                    }
                    Err(timeout @ FolioError::Timeout { .. }) => {
                        if self.held_after_timeout(content_id, user, kind).await != Some(false) {
                            return Err(timeout);
                        }
                        warn!(content_id = %content_id, %kind, "timed-out delete landed");
                    }
                    Err(e) => return Err(e),
                }
                debug!(content_id = %content_id, %kind, "reaction removed");
                Ok(ToggleOutcome {
                    action: ToggleAction::Removed,
                    kind,
                    displaced: None,
                })
            }
            None => {
                let inserted = bounded(
                    self.timeout,
                    "insert_reaction",
                    self.store.insert_reaction(content_id, user, kind),
                )
                .await;
                let displaced = match inserted {
                    Ok(displaced) => displaced,
                    Err(FolioError::ConstraintViolation { message }) => {
                        warn!(content_id = %content_id, %kind, %message, "concurrent toggle already added reaction");
                        None
                    }
                    Err(timeout @ FolioError::Timeout { .. }) => {
                        if self.held_after_timeout(content_id, user, kind).await != Some(true) {
                            return Err(timeout);
                        }
                        // Whether an opposite reaction was displaced is unknown here.
                        warn!(content_id = %content_id, %kind, "timed-out insert landed");
                        None
                    }
                    Err(e) => return Err(e),
                };
                debug!(content_id = %content_id, %kind, ?displaced, "reaction added");
                Ok(ToggleOutcome {
                    action: ToggleAction::Added,
                    kind,
                    displaced,
                })
            }
        }
    }

    /// Whether the user holds `kind` once a timed-out write has settled.
    ///
    /// `None` when the read-back fails as well, leaving the outcome unknown.
    async fn held_after_timeout(
        &self,
        content_id: &ContentId,
        user: &UserId,
        kind: ReactionKind,
    ) -> Option<bool> {
        let found = bounded(
            self.timeout,
            "find_reaction",
            self.store.find_reaction(content_id, user, kind),
        )
        .await;
        match found {
            Ok(record) => Some(record.is_some()),
            Err(e) => {
                warn!(content_id = %content_id, %kind, error = %e, "toggle outcome unknown");
                None
            }
        }
    }

    /// Per-kind tallies for an item; zero counts plus the error on failure.
    pub async fn reaction_counts(&self, content_id: &ContentId) -> Fetched<ReactionCounts> {
        let records = bounded(
            self.timeout,
            "fetch_reactions",
            self.store.fetch_reactions(content_id),
        )
        .await;
        let fetched = Fetched::from_result(records.map(|r| ReactionCounts::tally(&r)));
        if let Some(e) = &fetched.error {
            warn!(content_id = %content_id, error = %e, "reaction counts degraded");
        }
        fetched
    }

    /// Which reactions the acting user holds on an item.
    ///
    /// An unresolved session is treated as holding none, without an error.
    pub async fn user_reactions(
        &self,
        session: &Session,
        content_id: &ContentId,
    ) -> Fetched<UserReactions> {
        let Some(user) = session.acting_user() else {
            return Fetched::ok(UserReactions::default());
        };
        let records = bounded(
            self.timeout,
            "fetch_reactions",
            self.store.fetch_reactions(content_id),
        )
        .await;
        let fetched = Fetched::from_result(records.map(|records| held_by(user, &records)));
        if let Some(e) = &fetched.error {
            warn!(content_id = %content_id, error = %e, "user reactions degraded");
        }
        fetched
    }

    /// Counts and user reactions for one item, both derived from a single
    /// fetch of its records.
    pub async fn reaction_summary(
        &self,
        session: &Session,
        content_id: &ContentId,
    ) -> ReactionSummary {
        let records = bounded(
            self.timeout,
            "fetch_reactions",
            self.store.fetch_reactions(content_id),
        )
        .await;
        match records {
            Ok(records) => ReactionSummary {
                content_id: content_id.clone(),
                counts: ReactionCounts::tally(&records),
                user: session
                    .acting_user()
                    .map(|user| held_by(user, &records))
                    .unwrap_or_default(),
                degraded: false,
            },
            Err(e) => {
                warn!(content_id = %content_id, error = %e, "reaction summary degraded");
                ReactionSummary {
                    content_id: content_id.clone(),
                    counts: ReactionCounts::default(),
                    user: UserReactions::default(),
                    degraded: true,
                }
            }
        }
    }

    /// Summaries for every visible item. Items are independent keys, so all
    /// fetches run concurrently; results keep the order of `content_ids`.
    pub async fn reaction_summaries(
        &self,
        session: &Session,
        content_ids: &[ContentId],
    ) -> Vec<ReactionSummary> {
        futures::future::join_all(
            content_ids
                .iter()
                .map(|id| self.reaction_summary(session, id)),
        )
        .await
    }
}

fn held_by(user: &UserId, records: &[ReactionRecord]) -> UserReactions {
    UserReactions::from_kinds(
        records
            .iter()
            .filter(|r| &r.user_id == user)
            .map(|r| r.kind),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::ReactionId;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that forgets nothing and can be told to fail or lag.
    #[derive(Default)]
    struct ScriptedStore {
        records: Mutex<Vec<ReactionRecord>>,
        next_id: Mutex<u32>,
        fail_reads: bool,
        deny_writes: bool,
        /// Pretend a concurrent toggle won the insert race.
        lose_insert_race: bool,
        /// Pretend a concurrent toggle won the delete race.
        lose_delete_race: bool,
        delay: Option<Duration>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ReactionStore for ScriptedStore {
        async fn fetch_reactions(
            &self,
            content_id: &ContentId,
        ) -> Result<Vec<ReactionRecord>, FolioError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_reads {
                return Err(FolioError::storage_msg("backend offline"));
            }
            Ok(self
                .records
                .lock()
                .unwrap()
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
            Ok(self
                .records
                .lock()
                .unwrap()
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
            if self.deny_writes {
                return Err(FolioError::PermissionDenied {
                    message: "row level security".into(),
                });
            }
            let mut id = self.next_id.lock().unwrap();
            *id += 1;
            self.records.lock().unwrap().push(ReactionRecord {
                id: ReactionId(format!("r{id}")),
                content_id: content_id.clone(),
                user_id: user_id.clone(),
                kind,
            });
            if self.lose_insert_race {
                return Err(FolioError::ConstraintViolation {
                    message: "duplicate".into(),
                });
            }
            Ok(None)
        }

        async fn delete_reaction(&self, id: &ReactionId) -> Result<(), FolioError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|r| &r.id != id);
            if self.lose_delete_race {
                return Err(FolioError::NotFound {
                    entity: "reaction",
                    id: id.0.clone(),
                });
            }
            Ok(())
        }
    }

    /// Store that runs each write on a detached task behind a single-writer
    /// queue, the way a connection thread keeps working on a call whose
    /// caller has stopped waiting.
    struct DetachedWrites {
        records: Arc<Mutex<Vec<ReactionRecord>>>,
        queue: Arc<tokio::sync::Mutex<()>>,
        write_delay: Duration,
        writes_land: bool,
    }

    impl DetachedWrites {
        fn new(write_delay: Duration, writes_land: bool) -> Self {
            Self {
                records: Arc::new(Mutex::new(Vec::new())),
                queue: Arc::new(tokio::sync::Mutex::new(())),
                write_delay,
                writes_land,
            }
        }

        async fn detached_write(
            &self,
            apply: impl FnOnce(&mut Vec<ReactionRecord>) + Send + 'static,
        ) -> Result<(), FolioError> {
            let records = self.records.clone();
            let queue = self.queue.clone();
            let delay = self.write_delay;
            let lands = self.writes_land;
            tokio::spawn(async move {
                let _turn = queue.lock().await;
                tokio::time::sleep(delay).await;
                if !lands {
                    return Err(FolioError::storage_msg("write rolled back"));
                }
                apply(&mut records.lock().unwrap());
                Ok(())
            })
            .await
            .map_err(|e| FolioError::Internal(e.to_string()))?
        }
    }

    #[async_trait]
    impl ReactionStore for DetachedWrites {
        async fn fetch_reactions(
            &self,
            content_id: &ContentId,
        ) -> Result<Vec<ReactionRecord>, FolioError> {
            let _turn = self.queue.lock().await;
            Ok(self
                .records
                .lock()
                .unwrap()
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
            let _turn = self.queue.lock().await;
            Ok(self
                .records
                .lock()
                .unwrap()
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
            let record = ReactionRecord {
                id: ReactionId("r1".into()),
                content_id: content_id.clone(),
                user_id: user_id.clone(),
                kind,
            };
            self.detached_write(move |records| records.push(record))
                .await?;
            Ok(None)
        }

        async fn delete_reaction(&self, id: &ReactionId) -> Result<(), FolioError> {
            let id = id.clone();
            self.detached_write(move |records| records.retain(|r| r.id != id))
                .await
        }
    }

    fn client(store: ScriptedStore) -> ReactionClient {
        ReactionClient::new(Arc::new(store), Duration::from_secs(5))
    }

    fn post() -> ContentId {
        ContentId::from("post-1")
    }

    #[tokio::test]
    async fn toggle_twice_restores_absent_state_and_counts() {
        let client = client(ScriptedStore::default());
        let session = Session::anonymous("visitor-1");

        let before = client.reaction_counts(&post()).await.value;
        let first = client
            .toggle_reaction(&session, &post(), ReactionKind::Positive)
            .await
            .unwrap();
        assert_eq!(first.action, ToggleAction::Added);
        assert_eq!(client.reaction_counts(&post()).await.value.positive, 1);

        let second = client
            .toggle_reaction(&session, &post(), ReactionKind::Positive)
            .await
            .unwrap();
        assert_eq!(second.action, ToggleAction::Removed);
        assert_eq!(client.reaction_counts(&post()).await.value, before);
        assert!(!client.user_reactions(&session, &post()).await.value.positive);
    }

    #[tokio::test]
    async fn unresolved_session_cannot_toggle() {
        let store = Arc::new(ScriptedStore::default());
        let client = ReactionClient::new(store.clone(), Duration::from_secs(5));
        let err = client
            .toggle_reaction(&Session::Unresolved, &post(), ReactionKind::Useful)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::IdentityUnavailable));

        let blank = Session::anonymous("  ");
        assert!(client
            .toggle_reaction(&blank, &post(), ReactionKind::Useful)
            .await
            .is_err());
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unresolved_session_reads_no_reactions() {
        let client = client(ScriptedStore {
            fail_reads: true,
            ..Default::default()
        });
        let fetched = client.user_reactions(&Session::Unresolved, &post()).await;
        assert_eq!(fetched.value, UserReactions::default());
        assert!(!fetched.is_degraded());
    }

    #[tokio::test]
    async fn constraint_violation_converges_to_added() {
        let client = client(ScriptedStore {
            lose_insert_race: true,
            ..Default::default()
        });
        let outcome = client
            .toggle_reaction(&Session::anonymous("v"), &post(), ReactionKind::Useful)
            .await
            .unwrap();
        assert_eq!(outcome.action, ToggleAction::Added);
    }

    #[tokio::test]
    async fn missing_record_on_delete_converges_to_removed() {
        let client = client(ScriptedStore {
            lose_delete_race: true,
            ..Default::default()
        });
        let session = Session::anonymous("v");
        client
            .toggle_reaction(&session, &post(), ReactionKind::Useful)
            .await
            .unwrap();
        let outcome = client
            .toggle_reaction(&session, &post(), ReactionKind::Useful)
            .await
            .unwrap();
        assert_eq!(outcome.action, ToggleAction::Removed);
    }

    #[tokio::test]
    async fn permission_denied_propagates() {
        let client = client(ScriptedStore {
            deny_writes: true,
            ..Default::default()
        });
        let err = client
            .toggle_reaction(&Session::authenticated("admin"), &post(), ReactionKind::Negative)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn failed_counts_degrade_to_zero() {
        let client = client(ScriptedStore {
            fail_reads: true,
            ..Default::default()
        });
        let fetched = client.reaction_counts(&post()).await;
        assert_eq!(fetched.value, ReactionCounts::default());
        assert!(matches!(fetched.error, Some(FolioError::Storage { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out() {
        let store = ScriptedStore {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        };
        let client = ReactionClient::new(Arc::new(store), Duration::from_secs(10));
        let fetched = client.reaction_counts(&post()).await;
        assert!(matches!(fetched.error, Some(FolioError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_insert_that_lands_reports_added() {
        let store = Arc::new(DetachedWrites::new(Duration::from_millis(1500), true));
        let client = ReactionClient::new(store.clone(), Duration::from_secs(1));

        let outcome = client
            .toggle_reaction(&Session::anonymous("v"), &post(), ReactionKind::Positive)
            .await
            .unwrap();
        assert_eq!(outcome.action, ToggleAction::Added);
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_insert_that_fails_leaves_state_unchanged() {
        let store = Arc::new(DetachedWrites::new(Duration::from_millis(1500), false));
        let client = ReactionClient::new(store.clone(), Duration::from_secs(1));

        let err = client
            .toggle_reaction(&Session::anonymous("v"), &post(), ReactionKind::Positive)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Timeout { .. }));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_delete_that_lands_reports_removed() {
        let store = Arc::new(DetachedWrites::new(Duration::from_millis(1500), true));
        store.records.lock().unwrap().push(ReactionRecord {
            id: ReactionId("r0".into()),
            content_id: post(),
            user_id: UserId::from("v"),
            kind: ReactionKind::Useful,
        });
        let client = ReactionClient::new(store.clone(), Duration::from_secs(1));

        let outcome = client
            .toggle_reaction(&Session::anonymous("v"), &post(), ReactionKind::Useful)
            .await
            .unwrap();
        assert_eq!(outcome.action, ToggleAction::Removed);
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_outcome_keeps_the_timeout() {
        let store = Arc::new(DetachedWrites::new(Duration::from_secs(5), true));
        let client = ReactionClient::new(store, Duration::from_secs(1));

        let err = client
            .toggle_reaction(&Session::anonymous("v"), &post(), ReactionKind::Positive)
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Timeout { .. }));
    }

    #[tokio::test]
    async fn summary_fetches_records_once() {
        let store = Arc::new(ScriptedStore::default());
        let client = ReactionClient::new(store.clone(), Duration::from_secs(5));
        let session = Session::anonymous("v");
        client
            .toggle_reaction(&session, &post(), ReactionKind::Useful)
            .await
            .unwrap();
        let before = store.fetches.load(Ordering::SeqCst);

        let summary = client.reaction_summary(&session, &post()).await;
        assert_eq!(store.fetches.load(Ordering::SeqCst), before + 1);
        assert_eq!(summary.counts.useful, 1);
        assert!(summary.user.useful);
        assert!(!summary.degraded);
    }

    #[tokio::test]
    async fn failed_summary_is_degraded_defaults() {
        let client = client(ScriptedStore {
            fail_reads: true,
            ..Default::default()
        });
        let summary = client.reaction_summary(&Session::anonymous("v"), &post()).await;
        assert!(summary.degraded);
        assert_eq!(summary.counts, ReactionCounts::default());
        assert_eq!(summary.user, UserReactions::default());
    }

    #[tokio::test]
    async fn summaries_keep_request_order() {
        let client = client(ScriptedStore::default());
        let session = Session::anonymous("v");
        let other = ContentId::from("post-2");
        client
            .toggle_reaction(&session, &other, ReactionKind::Useful)
            .await
            .unwrap();

        let summaries = client
            .reaction_summaries(&session, &[post(), other.clone()])
            .await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].content_id, post());
        assert_eq!(summaries[1].counts.useful, 1);
        assert!(summaries[1].user.useful);
        assert!(!summaries[1].degraded);
    }

    #[test]
    fn parse_kind_rejects_unknown_names() {
        assert_eq!(parse_kind("Useful").unwrap(), ReactionKind::Useful);
        assert!(matches!(
            parse_kind("love"),
            Err(FolioError::InvalidInput(_))
        ));
    }
}
