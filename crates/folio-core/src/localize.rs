// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Localized content resolution with primary-language fallback.
//!
//! Resolution never fails: a missing translation falls back to the primary
//! language, and a missing primary value resolves to the empty string.

use crate::types::{ContentItem, Field, Language, LocalizedText};

/// Resolve a localized text for `language`.
pub fn resolve_text(text: &LocalizedText, language: Language) -> String {
    match text {
        LocalizedText::Plain(value) => value.clone(),
        LocalizedText::Pair { .. } => {
            let requested = text.raw(language);
            if !requested.trim().is_empty() {
                return requested.to_string();
            }
            let primary = text.raw(Language::PRIMARY);
            if primary.trim().is_empty() {
                String::new()
            } else {
                primary.to_string()
            }
        }
    }
}

/// Resolve one field of a content item.
pub fn resolve(item: &ContentItem, field: Field, language: Language) -> String {
    resolve_text(item.field(field), language)
}

/// String-keyed form of [`resolve`]: `field_prefix` is `title`, `excerpt`,
/// `body`/`content` or `category`.
///
/// An unknown prefix yields `""`; an unknown language code resolves in the
/// primary language.
pub fn resolve_named(item: &ContentItem, field_prefix: &str, language_code: &str) -> String {
    match field_prefix.trim().parse::<Field>() {
        Ok(field) => resolve(item, field, Language::from_code_lossy(language_code)),
        Err(_) => String::new(),
    }
}
