// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Listing state mirrored into the page URL.
//!
//! `search` and `category` live in the query string so a filtered listing
//! can be shared; writes replace the current history entry instead of
//! pushing a new one. The page number stays in memory and is lost on reload.

use folio_core::query::{normalize_key, total_pages};
use folio_core::{ALL_CATEGORIES, FolioError};
use serde::Serialize;
use url::Url;
use url::form_urlencoded;

pub const SEARCH_PARAM: &str = "search";
pub const CATEGORY_PARAM: &str = "category";

/// Current search text, category filter and 1-based page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub search: String,
    pub category: String,
    pub page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            page: 1,
        }
    }
}

impl QueryState {
    /// Build a state from raw request values, defaulting what is missing.
    pub fn from_parts(search: Option<&str>, category: Option<&str>, page: Option<u32>) -> Self {
        Self {
            search: normalize_search(search.unwrap_or_default()),
            category: normalize_category(category.unwrap_or_default()),
            page: page.unwrap_or(1).max(1),
        }
    }

    fn same_filters(&self, other: &QueryState) -> bool {
        self.search == other.search && self.category == other.category
    }
}

/// Whitespace-only search text means no search.
fn normalize_search(text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        text.to_string()
    }
}

/// Blank input and any spelling of the sentinel mean `all`.
fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() || normalize_key(trimmed) == ALL_CATEGORIES {
        ALL_CATEGORIES.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Access to the current address's query string.
pub trait Location {
    /// Query string without the leading `?`; empty when there is none.
    fn query(&self) -> String;

    /// Swap the query string in place without adding a history entry.
    fn replace_query(&mut self, query: &str);
}

/// [`Location`] backed by a parsed URL with a simple history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    current: Url,
    history: Vec<Url>,
}

impl MemoryLocation {
    pub fn new(url: &str) -> Result<Self, FolioError> {
        let current = Url::parse(url)
            .map_err(|e| FolioError::InvalidInput(format!("invalid location {url}: {e}")))?;
        Ok(Self {
            history: vec![current.clone()],
            current,
        })
    }

    /// Navigate to `url` as a new history entry (link click, back/forward).
    pub fn navigate(&mut self, url: &str) -> Result<(), FolioError> {
        let next = self
            .current
            .join(url)
            .map_err(|e| FolioError::InvalidInput(format!("invalid location {url}: {e}")))?;
        self.history.push(next.clone());
        self.current = next;
        Ok(())
    }

    pub fn url(&self) -> &Url {
        &self.current
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Location for MemoryLocation {
    fn query(&self) -> String {
        self.current.query().unwrap_or_default().to_string()
    }

    fn replace_query(&mut self, query: &str) {
        if query.is_empty() {
            self.current.set_query(None);
        } else {
            self.current.set_query(Some(query));
        }
        if let Some(last) = self.history.last_mut() {
            *last = self.current.clone();
        }
    }
}

/// Owns the listing state and keeps it in step with a [`Location`].
pub struct BlogStateController<L: Location> {
    location: L,
    state: QueryState,
    page_size: u32,
    total_pages: Option<u32>,
}

impl<L: Location> BlogStateController<L> {
    /// Create a controller and read the initial filters from `location`.
    pub fn new(location: L, page_size: u32) -> Self {
        let mut controller = Self {
            location,
            state: QueryState::default(),
            page_size: page_size.max(1),
            total_pages: None,
        };
        controller.sync_from_location();
        controller
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Last computed page count, if a total has been applied.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// The stored text is exactly what a later [`Self::sync_from_location`]
    /// reads back, so syncing after a set never reports a change.
    pub fn set_search_text(&mut self, text: &str) {
        self.state.search = normalize_search(text);
        self.state.page = 1;
        let value = (!self.state.search.is_empty()).then(|| self.state.search.clone());
        self.write_param(SEARCH_PARAM, value.as_deref());
    }

    pub fn set_category_filter(&mut self, category: &str) {
        self.state.category = normalize_category(category);
        self.state.page = 1;
        let value = (self.state.category != ALL_CATEGORIES).then(|| self.state.category.clone());
        self.write_param(CATEGORY_PARAM, value.as_deref());
    }

    /// Change the page without touching filters or the URL.
    pub fn set_page_number(&mut self, page: u32) {
        self.state.page = page.max(1);
    }

    /// Re-read filters after the URL changed outside the controller.
    ///
    /// Returns whether the filters changed; the page resets to 1 only then.
    pub fn sync_from_location(&mut self) -> bool {
        let mut next = QueryState {
            page: self.state.page,
            ..QueryState::default()
        };
        for (key, value) in form_urlencoded::parse(self.location.query().as_bytes()) {
            match key.as_ref() {
                SEARCH_PARAM => next.search = normalize_search(&value),
                CATEGORY_PARAM => next.category = normalize_category(&value),
                _ => {}
            }
        }
        if next.same_filters(&self.state) {
            return false;
        }
        next.page = 1;
        self.state = next;
        true
    }

    /// Record a new filtered total and clamp the page into range.
    ///
    /// Returns whether the page moved.
    pub fn apply_total(&mut self, total_count: u64) -> bool {
        let pages = total_pages(total_count, self.page_size);
        if self.total_pages == Some(pages) {
            return false;
        }
        self.total_pages = Some(pages);

        let before = self.state.page;
        if pages == 0 {
            self.state.page = 1;
        } else if self.state.page > pages {
            self.state.page = pages;
        }
        before != self.state.page
    }

    /// Set or remove one parameter, preserving the order and values of the rest.
    fn write_param(&mut self, name: &str, value: Option<&str>) {
        let current = self.location.query();
        let mut pairs: Vec<(String, String)> = form_urlencoded::parse(current.as_bytes())
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if let Some(value) = value {
            pairs.push((name.to_string(), value.to_string()));
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.location.replace_query(&query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(url: &str) -> BlogStateController<MemoryLocation> {
        BlogStateController::new(MemoryLocation::new(url).unwrap(), 8)
    }

    #[test]
    fn initial_state_comes_from_the_url() {
        let c = controller("https://example.com/blog?search=bank&category=Licensing");
        assert_eq!(c.state().search, "bank");
        assert_eq!(c.state().category, "Licensing");
        assert_eq!(c.state().page, 1);
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let c = controller("https://example.com/blog?category=");
        assert_eq!(c.state(), &QueryState::default());
    }

    #[test]
    fn search_writes_param_and_resets_page() {
        let mut c = controller("https://example.com/blog?utm_source=mail");
        c.set_page_number(3);
        c.set_search_text("offshore bank");

        assert_eq!(c.state().page, 1);
        assert_eq!(
            c.location().url().query(),
            Some("utm_source=mail&search=offshore+bank")
        );
        assert_eq!(c.location().history_len(), 1);
    }

    #[test]
    fn empty_search_removes_param() {
        let mut c = controller("https://example.com/blog?search=bank&lang=ru");
        c.set_search_text("");
        assert_eq!(c.location().url().query(), Some("lang=ru"));

        c.set_category_filter("Banking");
        c.set_category_filter("all");
        assert_eq!(c.location().url().query(), Some("lang=ru"));
    }

    #[test]
    fn clearing_every_param_drops_the_query() {
        let mut c = controller("https://example.com/blog?category=Banking");
        c.set_category_filter("ALL");
        assert_eq!(c.location().url().as_str(), "https://example.com/blog");
        assert_eq!(c.state().category, "all");
    }

    #[test]
    fn stored_filters_match_what_sync_reads_back() {
        let mut c = controller("https://example.com/blog?search=bank&category=Banking");
        c.set_search_text("   ");
        c.set_category_filter("ALL");
        assert_eq!(c.state().search, "");
        assert_eq!(c.state().category, "all");

        c.set_page_number(3);
        assert!(!c.sync_from_location());
        assert_eq!(c.state().page, 3);
    }

    #[test]
    fn page_changes_stay_out_of_the_url() {
        let mut c = controller("https://example.com/blog?search=tax");
        c.set_page_number(0);
        assert_eq!(c.state().page, 1);
        c.set_page_number(4);
        assert_eq!(c.state().page, 4);
        assert_eq!(c.state().search, "tax");
        assert_eq!(c.location().url().query(), Some("search=tax"));
    }

    #[test]
    fn back_navigation_resyncs_filters() {
        let mut c = controller("https://example.com/blog");
        c.location_mut()
            .navigate("/blog?category=Banking")
            .unwrap();
        c.set_page_number(2);

        assert!(c.sync_from_location());
        assert_eq!(c.state().category, "Banking");
        assert_eq!(c.state().page, 1);

        c.set_page_number(2);
        assert!(!c.sync_from_location());
        assert_eq!(c.state().page, 2);
    }

    #[test]
    fn clamp_after_filter_shrinks_results() {
        let mut c = controller("https://example.com/blog");
        c.apply_total(10);
        c.set_page_number(2);
        assert_eq!(c.total_pages(), Some(2));

        assert!(c.apply_total(3));
        assert_eq!(c.state().page, 1);
    }

    #[test]
    fn empty_result_clamps_to_first_page() {
        let mut c = controller("https://example.com/blog");
        c.apply_total(40);
        c.set_page_number(5);
        assert!(c.apply_total(0));
        assert_eq!(c.state().page, 1);
        assert_eq!(c.total_pages(), Some(0));
    }

    #[test]
    fn unchanged_total_leaves_page_alone() {
        let mut c = controller("https://example.com/blog");
        c.apply_total(20);
        c.set_page_number(3);
        assert!(!c.apply_total(20));
        assert_eq!(c.state().page, 3);
    }

    proptest::proptest! {
        #[test]
        fn page_stays_in_range_after_total_changes(
            page in 1u32..50,
            first in 0u64..400,
            second in 0u64..400,
            page_size in 1u32..20,
        ) {
            let mut c = BlogStateController::new(
                MemoryLocation::new("https://example.com/blog").unwrap(),
                page_size,
            );
            c.apply_total(first);
            c.set_page_number(page);
            let changed = total_pages(first, page_size) != total_pages(second, page_size);
            c.apply_total(second);

            let pages = total_pages(second, page_size);
            proptest::prop_assert!(c.state().page >= 1);
            if changed {
                proptest::prop_assert!(c.state().page <= pages.max(1));
            } else {
                proptest::prop_assert_eq!(c.state().page, page);
            }
        }
    }
}
