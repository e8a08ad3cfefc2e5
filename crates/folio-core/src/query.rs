// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing filters and the derived-collection rules every content backend
//! must agree on: matching, ordering, category enumeration, featured
//! selection and pagination math.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::localize::resolve;
use crate::types::{ContentId, ContentItem, Field, Language};

/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Search and category filter for a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub search: String,
    pub category: String,
    pub language: Language,
    /// Item left out of the results (the spotlighted featured post).
    pub exclude: Option<ContentId>,
}

impl ContentFilter {
    pub fn new(search: impl Into<String>, category: impl Into<String>, language: Language) -> Self {
        Self {
            search: search.into(),
            category: category.into(),
            language,
            exclude: None,
        }
    }

    /// Lower-cased, trimmed search needle; empty means "match everything".
    pub fn search_needle(&self) -> String {
        normalize_key(&self.search)
    }

    /// Lower-cased category key, or `None` for the `all` sentinel.
    pub fn category_key(&self) -> Option<String> {
        let key = normalize_key(&self.category);
        if key.is_empty() || key == ALL_CATEGORIES {
            None
        } else {
            Some(key)
        }
    }

    /// Whether a search or category filter narrows the listing.
    pub fn is_active(&self) -> bool {
        !self.search_needle().is_empty() || self.category_key().is_some()
    }

    /// Whether `item` passes both the search and the category predicate.
    pub fn matches(&self, item: &ContentItem) -> bool {
        if !item.published {
            return false;
        }
        if self.exclude.as_ref() == Some(&item.id) {
            return false;
        }
        self.matches_search(item) && self.matches_category(item)
    }

    fn matches_search(&self, item: &ContentItem) -> bool {
        let needle = self.search_needle();
        if needle.is_empty() {
            return true;
        }
        search_haystack(item, self.language)
            .iter()
            .any(|part| part.contains(&needle))
    }

    /// A category key matches in any language, so a link shared from one
    /// language version still filters when opened in the other.
    fn matches_category(&self, item: &ContentItem) -> bool {
        match self.category_key() {
            None => true,
            Some(key) => Language::ALL
                .iter()
                .any(|&language| category_key(item, language) == key),
        }
    }
}

/// One page of a listing plus the size of the whole filtered set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPage {
    pub items: Vec<ContentItem>,
    pub total_count: u64,
}

/// An entry of the category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    /// Lower-cased comparison key.
    pub key: String,
    /// Display spelling.
    pub label: String,
}

impl CategoryOption {
    pub fn all() -> Self {
        Self {
            key: ALL_CATEGORIES.to_string(),
            label: ALL_CATEGORIES.to_string(),
        }
    }
}

/// Case-normalization used for search needles and category keys.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// The lower-cased strings a search needle is matched against: the resolved
/// title, the resolved excerpt, then every tag.
pub fn search_haystack(item: &ContentItem, language: Language) -> Vec<String> {
    let mut parts = Vec::with_capacity(item.tags.len() + 2);
    parts.push(resolve(item, Field::Title, language).to_lowercase());
    parts.push(resolve(item, Field::Excerpt, language).to_lowercase());
    parts.extend(item.tags.iter().map(|t| t.to_lowercase()));
    parts
}

/// The lower-cased resolved category of an item.
pub fn category_key(item: &ContentItem, language: Language) -> String {
    normalize_key(&resolve(item, Field::Category, language))
}

/// Listing order: newest first, ties by id.
pub fn listing_order(a: &ContentItem, b: &ContentItem) -> std::cmp::Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Distinct categories across `items`, `all` first, then sorted by key.
///
/// Case variants collapse into one entry whose label is the smallest
/// original spelling.
pub fn distinct_categories<'a>(
    items: impl IntoIterator<Item = &'a ContentItem>,
    language: Language,
) -> Vec<CategoryOption> {
    let mut by_key: BTreeMap<String, String> = BTreeMap::new();
    for item in items.into_iter().filter(|i| i.published) {
        let label = resolve(item, Field::Category, language).trim().to_string();
        let key = normalize_key(&label);
        if key.is_empty() || key == ALL_CATEGORIES {
            continue;
        }
        by_key
            .entry(key)
            .and_modify(|existing| {
                if label < *existing {
                    *existing = label.clone();
                }
            })
            .or_insert(label);
    }

    std::iter::once(CategoryOption::all())
        .chain(
            by_key
                .into_iter()
                .map(|(key, label)| CategoryOption { key, label }),
        )
        .collect()
}

/// The spotlighted item: the most recently published featured item, ties
/// broken by smallest id.
pub fn select_featured<'a>(
    items: impl IntoIterator<Item = &'a ContentItem>,
) -> Option<&'a ContentItem> {
    items
        .into_iter()
        .filter(|i| i.published && i.featured)
        .min_by(|a, b| listing_order(a, b))
}

/// Number of pages needed for `total_count` items.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Zero-based offset of a 1-based page.
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(page_size)
}

/// Filter, order and slice an in-memory item set.
pub fn paginate(
    items: &[ContentItem],
    filter: &ContentFilter,
    page: u32,
    page_size: u32,
) -> ContentPage {
    let mut matching: Vec<&ContentItem> = items.iter().filter(|i| filter.matches(i)).collect();
    matching.sort_by(|a, b| listing_order(a, b));

    let total_count = matching.len() as u64;
    let offset = usize::try_from(page_offset(page, page_size)).unwrap_or(usize::MAX);
    let items = matching
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .cloned()
        .collect();

    ContentPage { items, total_count }
}
