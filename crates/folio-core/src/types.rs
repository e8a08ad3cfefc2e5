// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store traits, the blog engine and the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FolioError;

/// Unique identifier for a content item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

/// Opaque acting-user key (authenticated principal or anonymous session id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identifier of a stored reaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(pub String);

macro_rules! id_helpers {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

id_helpers!(ContentId, UserId, ReactionId);

/// Site languages. English is the primary language and the fallback target.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// The language every localized field falls back to.
    pub const PRIMARY: Language = Language::En;

    pub const ALL: [Language; 2] = [Language::En, Language::Ru];

    /// Parse a language code, resolving unknown codes to the primary language.
    pub fn from_code_lossy(code: &str) -> Language {
        code.trim().parse().unwrap_or(Language::PRIMARY)
    }
}

/// A text field that is either language-neutral or stored per language.
///
/// Deserializes from a bare string or from `{ "en": ..., "ru": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Pair {
        #[serde(rename = "en")]
        primary: String,
        #[serde(rename = "ru", default)]
        secondary: String,
    },
}

impl LocalizedText {
    pub fn pair(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        LocalizedText::Pair {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        LocalizedText::Plain(value.into())
    }

    /// The raw value stored for a language, without fallback.
    pub fn raw(&self, language: Language) -> &str {
        match (self, language) {
            (LocalizedText::Plain(s), _) => s,
            (LocalizedText::Pair { primary, .. }, Language::En) => primary,
            (LocalizedText::Pair { secondary, .. }, Language::Ru) => secondary,
        }
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

/// Field family selector for localized lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Field {
    Title,
    Excerpt,
    #[strum(to_string = "body", serialize = "content")]
    Body,
    Category,
}

/// Visual classification tag of a post card.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Blue,
    Orange,
    #[default]
    Neutral,
}

/// A blog post with bilingual text fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: LocalizedText,
    #[serde(default)]
    pub excerpt: LocalizedText,
    #[serde(default, alias = "content")]
    pub body: LocalizedText,
    #[serde(default)]
    pub category: LocalizedText,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub read_time: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl ContentItem {
    /// Returns the localized field selected by `field`.
    pub fn field(&self, field: Field) -> &LocalizedText {
        match field {
            Field::Title => &self.title,
            Field::Excerpt => &self.excerpt,
            Field::Body => &self.body,
            Field::Category => &self.category,
        }
    }

    /// Drop empty and duplicate tags, keeping first-seen order.
    pub fn normalize_tags(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.tags = std::mem::take(&mut self.tags)
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
    }

    /// Check the invariants a stored item must hold.
    pub fn validate(&self) -> Result<(), FolioError> {
        if self.id.0.trim().is_empty() {
            return Err(FolioError::InvalidInput("content id must not be empty".into()));
        }
        if self.published && self.title.raw(Language::PRIMARY).trim().is_empty() {
            return Err(FolioError::InvalidInput(format!(
                "published item {} has an empty primary-language title",
                self.id
            )));
        }
        Ok(())
    }
}

/// The fixed set of reactions a visitor can leave on a post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Positive,
    Negative,
    Useful,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 3] = [
        ReactionKind::Positive,
        ReactionKind::Negative,
        ReactionKind::Useful,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Positive => "positive",
            ReactionKind::Negative => "negative",
            ReactionKind::Useful => "useful",
        }
    }

    /// The kind that cannot be held together with this one.
    pub fn opposite(&self) -> Option<ReactionKind> {
        match self {
            ReactionKind::Positive => Some(ReactionKind::Negative),
            ReactionKind::Negative => Some(ReactionKind::Positive),
            ReactionKind::Useful => None,
        }
    }
}

/// A stored (item, user, kind) relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: ReactionId,
    pub content_id: ContentId,
    pub user_id: UserId,
    pub kind: ReactionKind,
}

/// Per-kind reaction tallies for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub positive: u64,
    pub negative: u64,
    pub useful: u64,
}

impl ReactionCounts {
    /// Tally records by kind.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a ReactionRecord>) -> Self {
        let mut counts = ReactionCounts::default();
        for record in records {
            *counts.slot(record.kind) += 1;
        }
        counts
    }

    pub fn get(&self, kind: ReactionKind) -> u64 {
        match kind {
            ReactionKind::Positive => self.positive,
            ReactionKind::Negative => self.negative,
            ReactionKind::Useful => self.useful,
        }
    }

    fn slot(&mut self, kind: ReactionKind) -> &mut u64 {
        match kind {
            ReactionKind::Positive => &mut self.positive,
            ReactionKind::Negative => &mut self.negative,
            ReactionKind::Useful => &mut self.useful,
        }
    }

    /// Bump the displayed counters after a successful toggle.
    pub fn apply(&mut self, outcome: &ToggleOutcome) {
        match outcome.action {
            ToggleAction::Added => *self.slot(outcome.kind) += 1,
            ToggleAction::Removed => {
                let slot = self.slot(outcome.kind);
                *slot = slot.saturating_sub(1);
            }
        }
        if let Some(displaced) = outcome.displaced {
            let slot = self.slot(displaced);
            *slot = slot.saturating_sub(1);
        }
    }
}

/// Which reactions the acting user currently holds on an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReactions {
    pub positive: bool,
    pub negative: bool,
    pub useful: bool,
}

impl UserReactions {
    pub fn from_kinds(kinds: impl IntoIterator<Item = ReactionKind>) -> Self {
        let mut reactions = UserReactions::default();
        for kind in kinds {
            reactions.set(kind, true);
        }
        reactions
    }

    pub fn has(&self, kind: ReactionKind) -> bool {
        match kind {
            ReactionKind::Positive => self.positive,
            ReactionKind::Negative => self.negative,
            ReactionKind::Useful => self.useful,
        }
    }

    pub fn set(&mut self, kind: ReactionKind, value: bool) {
        match kind {
            ReactionKind::Positive => self.positive = value,
            ReactionKind::Negative => self.negative = value,
            ReactionKind::Useful => self.useful = value,
        }
    }

    pub fn apply(&mut self, outcome: &ToggleOutcome) {
        self.set(outcome.kind, outcome.action == ToggleAction::Added);
        if let Some(displaced) = outcome.displaced {
            self.set(displaced, false);
        }
    }
}

/// Direction a toggle moved the (item, user, kind) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Result of a reaction toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub kind: ReactionKind,
    /// Opposite-polarity reaction removed as part of an add.
    pub displaced: Option<ReactionKind>,
}

/// Explicit acting-user context passed into reaction operations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    Anonymous(UserId),
    Authenticated(UserId),
    #[default]
    Unresolved,
}

impl Session {
    pub fn anonymous(id: impl Into<String>) -> Self {
        Session::Anonymous(UserId(id.into()))
    }

    pub fn authenticated(id: impl Into<String>) -> Self {
        Session::Authenticated(UserId(id.into()))
    }

    /// The opaque acting-user key, if one can be resolved.
    pub fn acting_user(&self) -> Option<&UserId> {
        match self {
            Session::Anonymous(id) | Session::Authenticated(id) if !id.0.trim().is_empty() => {
                Some(id)
            }
            _ => None,
        }
    }
}

/// A safe default value paired with the error that forced it, if any.
///
/// Reads that must never fail the caller return this instead of `Result`.
#[derive(Debug)]
pub struct Fetched<T> {
    pub value: T,
    pub error: Option<FolioError>,
}

impl<T> Fetched<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn degraded(value: T, error: FolioError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            error: self.error,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// Collapse a result into a value, substituting the default on failure.
    pub fn from_result(result: Result<T, FolioError>) -> Self {
        match result {
            Ok(value) => Fetched::ok(value),
            Err(e) => Fetched::degraded(T::default(), e),
        }
    }
}

/// Health status reported by storage health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}
