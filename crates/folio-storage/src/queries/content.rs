// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content item reads and writes.
//!
//! Search and category matching run against `content_search`, a per-language
//! projection whose text is lower-cased in Rust on write. SQLite's `lower()`
//! only folds ASCII, which would break case-insensitive Cyrillic search.

use chrono::{DateTime, Utc};
use folio_core::query::{category_key, page_offset, search_haystack};
use folio_core::{
    CategoryOption, ContentFilter, ContentId, ContentItem, ContentPage, Field, FolioError,
    Language, LocalizedText, resolve,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::queries::{conversion_error, format_timestamp};

/// Separator between haystack parts so a needle never matches across fields.
const HAYSTACK_SEPARATOR: char = '\u{1f}';

const ITEM_COLUMNS: &str = "c.id, c.title_en, c.title_ru, c.excerpt_en, c.excerpt_ru, \
     c.body_en, c.body_ru, c.category_en, c.category_ru, c.author, c.tags, c.read_time, \
     c.published_at, c.tone, c.featured, c.published";

const FILTER_CLAUSE: &str = "FROM content_items c
     JOIN content_search s ON s.content_id = c.id AND s.language = ?1
     WHERE c.published = 1
       AND (?2 = '' OR instr(s.haystack, ?2) > 0)
       AND (?3 IS NULL OR EXISTS (
           SELECT 1 FROM content_search k WHERE k.content_id = c.id AND k.category_key = ?3))
       AND (?4 IS NULL OR c.id <> ?4)";

fn split_localized(text: &LocalizedText) -> (String, Option<String>) {
    match text {
        LocalizedText::Plain(value) => (value.clone(), None),
        LocalizedText::Pair { primary, secondary } => (primary.clone(), Some(secondary.clone())),
    }
}

fn join_localized(primary: String, secondary: Option<String>) -> LocalizedText {
    match secondary {
        None => LocalizedText::Plain(primary),
        Some(secondary) => LocalizedText::Pair { primary, secondary },
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ContentItem> {
    let tags_json: String = row.get(10)?;
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).map_err(|e| conversion_error(10, e))?;
    let published_at: String = row.get(12)?;
    let published_at = DateTime::parse_from_rfc3339(&published_at)
        .map_err(|e| conversion_error(12, e))?
        .with_timezone(&Utc);
    let tone: String = row.get(13)?;
    let tone = tone.parse().map_err(|e| conversion_error(13, e))?;

    Ok(ContentItem {
        id: ContentId(row.get(0)?),
        title: join_localized(row.get(1)?, row.get(2)?),
        excerpt: join_localized(row.get(3)?, row.get(4)?),
        body: join_localized(row.get(5)?, row.get(6)?),
        category: join_localized(row.get(7)?, row.get(8)?),
        author: row.get(9)?,
        tags,
        read_time: row.get(11)?,
        published_at,
        tone,
        featured: row.get(14)?,
        published: row.get(15)?,
    })
}

/// Search projection row for one language.
struct SearchRow {
    language: String,
    haystack: String,
    category_key: String,
    category_label: String,
}

fn search_rows(item: &ContentItem) -> Vec<SearchRow> {
    Language::ALL
        .iter()
        .map(|&language| {
            let parts = search_haystack(item, language);
            let haystack = parts
                .iter()
                .map(|p| p.replace(HAYSTACK_SEPARATOR, " "))
                .collect::<Vec<_>>()
                .join(&HAYSTACK_SEPARATOR.to_string());
            SearchRow {
                language: language.to_string(),
                haystack,
                category_key: category_key(item, language),
                category_label: resolve(item, Field::Category, language).trim().to_string(),
            }
        })
        .collect()
}

/// Insert or update an item and rebuild its search rows.
///
/// Uses `ON CONFLICT DO UPDATE` rather than `INSERT OR REPLACE`: a replace
/// deletes the row first, which would cascade away its reactions.
pub async fn upsert_content(db: &Database, item: &ContentItem) -> Result<(), FolioError> {
    item.validate()?;
    let mut item = item.clone();
    item.normalize_tags();
    let tags = serde_json::to_string(&item.tags).map_err(FolioError::storage)?;
    let published_at = format_timestamp(&item.published_at);
    let rows = search_rows(&item);

    db.connection()
        .call(move |conn| {
            let (title_en, title_ru) = split_localized(&item.title);
            let (excerpt_en, excerpt_ru) = split_localized(&item.excerpt);
            let (body_en, body_ru) = split_localized(&item.body);
            let (category_en, category_ru) = split_localized(&item.category);

            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO content_items (id, title_en, title_ru, excerpt_en, excerpt_ru,
                     body_en, body_ru, category_en, category_ru, author, tags, read_time,
                     published_at, tone, featured, published)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                 ON CONFLICT(id) DO UPDATE SET
                     title_en = excluded.title_en, title_ru = excluded.title_ru,
                     excerpt_en = excluded.excerpt_en, excerpt_ru = excluded.excerpt_ru,
                     body_en = excluded.body_en, body_ru = excluded.body_ru,
                     category_en = excluded.category_en, category_ru = excluded.category_ru,
                     author = excluded.author, tags = excluded.tags,
                     read_time = excluded.read_time, published_at = excluded.published_at,
                     tone = excluded.tone, featured = excluded.featured,
                     published = excluded.published,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    item.id.0,
                    title_en,
                    title_ru,
                    excerpt_en,
                    excerpt_ru,
                    body_en,
                    body_ru,
                    category_en,
                    category_ru,
                    item.author,
                    tags,
                    item.read_time,
                    published_at,
                    item.tone.to_string(),
                    item.featured,
                    item.published,
                ],
            )?;
            tx.execute(
                "DELETE FROM content_search WHERE content_id = ?1",
                params![item.id.0],
            )?;
            for row in &rows {
                tx.execute(
                    "INSERT INTO content_search (content_id, language, haystack, category_key, category_label)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        item.id.0,
                        row.language,
                        row.haystack,
                        row.category_key,
                        row.category_label
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete an item. Reactions and search rows go with it via `ON DELETE CASCADE`.
pub async fn delete_content(db: &Database, id: &ContentId) -> Result<(), FolioError> {
    let key = id.0.clone();
    let affected = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM content_items WHERE id = ?1", params![key]))
        .await
        .map_err(crate::database::map_tr_err)?;
    if affected == 0 {
        return Err(FolioError::NotFound {
            entity: "content",
            id: id.0.clone(),
        });
    }
    Ok(())
}

/// Fetch a published item by id.
pub async fn get_content(db: &Database, id: &ContentId) -> Result<ContentItem, FolioError> {
    let key = id.0.clone();
    let item = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM content_items c WHERE c.id = ?1 AND c.published = 1"
                ),
                params![key],
                row_to_item,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    item.ok_or_else(|| FolioError::NotFound {
        entity: "content",
        id: id.0.clone(),
    })
}

/// One page of the filtered listing plus the filtered total.
pub async fn list_content_page(
    db: &Database,
    filter: &ContentFilter,
    page: u32,
    page_size: u32,
) -> Result<ContentPage, FolioError> {
    let language = filter.language.to_string();
    let needle = filter.search_needle().replace(HAYSTACK_SEPARATOR, " ");
    let category = filter.category_key();
    let exclude = filter.exclude.as_ref().map(|id| id.0.clone());
    let limit = i64::from(page_size);
    let offset = i64::try_from(page_offset(page, page_size)).unwrap_or(i64::MAX);

    db.connection()
        .call(move |conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) {FILTER_CLAUSE}"),
                params![language, needle, category, exclude],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} {FILTER_CLAUSE}
                 ORDER BY c.published_at DESC, c.id ASC
                 LIMIT ?5 OFFSET ?6"
            ))?;
            let items = stmt
                .query_map(
                    params![language, needle, category, exclude, limit, offset],
                    row_to_item,
                )?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ContentPage {
                items,
                total_count: u64::try_from(total).unwrap_or(0),
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recently published featured item, ties broken by smallest id.
pub async fn get_featured(db: &Database) -> Result<Option<ContentItem>, FolioError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM content_items c
                     WHERE c.published = 1 AND c.featured = 1
                     ORDER BY c.published_at DESC, c.id ASC
                     LIMIT 1"
                ),
                [],
                row_to_item,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Distinct categories for a language, `all` first, then by key.
pub async fn list_categories(
    db: &Database,
    language: Language,
) -> Result<Vec<CategoryOption>, FolioError> {
    let language = language.to_string();
    let options = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.category_key, MIN(s.category_label)
                 FROM content_search s
                 JOIN content_items c ON c.id = s.content_id
                 WHERE c.published = 1 AND s.language = ?1
                   AND s.category_key <> '' AND s.category_key <> 'all'
                 GROUP BY s.category_key
                 ORDER BY s.category_key",
            )?;
            let rows = stmt
                .query_map(params![language], |row| {
                    Ok(CategoryOption {
                        key: row.get(0)?,
                        label: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(std::iter::once(CategoryOption::all())
        .chain(options)
        .collect())
}

/// Number of stored items, published or not.
pub async fn count_content(db: &Database) -> Result<u64, FolioError> {
    let count: i64 = db
        .connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM content_items", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Tone;
    use tempfile::tempdir;

    async fn open_db(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("content.db");
        Database::open(path.to_str().unwrap()).await.unwrap()
    }

    fn post(id: &str, title: (&str, &str), category: &str, date: &str) -> ContentItem {
        ContentItem {
            id: ContentId::from(id),
            title: LocalizedText::pair(title.0, title.1),
            excerpt: LocalizedText::pair("", ""),
            body: LocalizedText::pair("Body", ""),
            category: LocalizedText::plain(category),
            author: "Editorial".into(),
            tags: vec![],
            read_time: "4 min".into(),
            published_at: format!("{date}T09:30:00Z").parse().unwrap(),
            tone: Tone::Orange,
            featured: false,
            published: true,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_preserves_item() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let mut item = post("p1", ("Guide", "Руководство"), "Banking", "2026-03-01");
        item.tags = vec!["EU".into(), "Cyprus".into()];

        upsert_content(&db, &item).await.unwrap();
        let loaded = get_content(&db, &item.id).await.unwrap();
        assert_eq!(loaded, item);
    }

    #[tokio::test]
    async fn upsert_updates_existing_row() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let mut item = post("p1", ("Guide", ""), "Banking", "2026-03-01");
        upsert_content(&db, &item).await.unwrap();

        item.title = LocalizedText::pair("Updated guide", "");
        upsert_content(&db, &item).await.unwrap();

        assert_eq!(count_content(&db).await.unwrap(), 1);
        let loaded = get_content(&db, &item.id).await.unwrap();
        assert_eq!(loaded.title.raw(Language::En), "Updated guide");
    }

    #[tokio::test]
    async fn unpublished_item_reads_as_not_found() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let mut item = post("draft", ("Draft", ""), "Banking", "2026-03-01");
        item.published = false;
        upsert_content(&db, &item).await.unwrap();

        let err = get_content(&db, &item.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_for_cyrillic() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        upsert_content(&db, &post("a", ("Banking", "Банковские счета"), "Banking", "2026-01-01"))
            .await
            .unwrap();
        upsert_content(&db, &post("b", ("Licensing", "Лицензии"), "Licensing", "2026-01-02"))
            .await
            .unwrap();

        let filter = ContentFilter::new("БАНК", "all", Language::Ru);
        let page = list_content_page(&db, &filter, 1, 8).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn listing_is_ordered_and_paged() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        for (id, date) in [("c", "2026-01-03"), ("a", "2026-01-01"), ("b", "2026-01-03")] {
            upsert_content(&db, &post(id, ("Title", ""), "Banking", date))
                .await
                .unwrap();
        }

        let filter = ContentFilter::new("", "all", Language::En);
        let first = list_content_page(&db, &filter, 1, 2).await.unwrap();
        let ids: Vec<&str> = first.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(first.total_count, 3);

        let second = list_content_page(&db, &filter, 2, 2).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn category_filter_and_exclusion() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        upsert_content(&db, &post("a", ("One", ""), "Company Registration", "2026-01-01"))
            .await
            .unwrap();
        upsert_content(&db, &post("b", ("Two", ""), "Banking", "2026-01-02"))
            .await
            .unwrap();
        upsert_content(&db, &post("c", ("Three", ""), "banking", "2026-01-03"))
            .await
            .unwrap();

        let mut filter = ContentFilter::new("", "BANKING", Language::En);
        assert_eq!(list_content_page(&db, &filter, 1, 8).await.unwrap().total_count, 2);

        filter.exclude = Some(ContentId::from("c"));
        let page = list_content_page(&db, &filter, 1, 8).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id.as_str(), "b");
    }

    #[tokio::test]
    async fn category_filter_accepts_either_language_key() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let mut item = post("eu", ("EU accounts", "Счета в ЕС"), "Banking", "2026-01-01");
        item.category = LocalizedText::pair("Banking", "Банкинг");
        upsert_content(&db, &item).await.unwrap();

        let shared_link = ContentFilter::new("", "Banking", Language::Ru);
        let page = list_content_page(&db, &shared_link, 1, 8).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id.as_str(), "eu");

        let russian_key = ContentFilter::new("", "банкинг", Language::En);
        assert_eq!(list_content_page(&db, &russian_key, 1, 8).await.unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn sub_millisecond_timestamps_round_trip_and_order() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let mut a = post("a", ("First", ""), "Banking", "2026-01-01");
        a.published_at = "2026-01-01T00:00:00.000100Z".parse().unwrap();
        let mut b = post("b", ("Second", ""), "Banking", "2026-01-01");
        b.published_at = "2026-01-01T00:00:00.000900Z".parse().unwrap();
        upsert_content(&db, &a).await.unwrap();
        upsert_content(&db, &b).await.unwrap();

        assert_eq!(get_content(&db, &b.id).await.unwrap().published_at, b.published_at);
        let filter = ContentFilter::new("", "all", Language::En);
        let page = list_content_page(&db, &filter, 1, 8).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        upsert_content(&db, &post("a", ("One", ""), "Licensing", "2026-01-01"))
            .await
            .unwrap();
        upsert_content(&db, &post("b", ("Two", ""), "banking", "2026-01-02"))
            .await
            .unwrap();
        upsert_content(&db, &post("c", ("Three", ""), "Banking", "2026-01-03"))
            .await
            .unwrap();

        let categories = list_categories(&db, Language::En).await.unwrap();
        let keys: Vec<&str> = categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["all", "banking", "licensing"]);
        assert_eq!(categories[1].label, "Banking");
    }

    #[tokio::test]
    async fn featured_picks_latest_then_smallest_id() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        for (id, date, featured) in [
            ("x", "2026-02-01", true),
            ("w", "2026-02-01", true),
            ("z", "2026-03-01", false),
        ] {
            let mut item = post(id, ("Title", ""), "Banking", date);
            item.featured = featured;
            upsert_content(&db, &item).await.unwrap();
        }

        let featured = get_featured(&db).await.unwrap().unwrap();
        assert_eq!(featured.id.as_str(), "w");
    }

    #[tokio::test]
    async fn delete_missing_item_is_not_found() {
        let dir = tempdir().unwrap();
        let db = open_db(&dir).await;
        let err = delete_content(&db, &ContentId::from("ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
