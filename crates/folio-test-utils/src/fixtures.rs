// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample posts.

use chrono::{DateTime, Utc};
use folio_core::{ContentId, ContentItem, LocalizedText, Tone};

/// A published post with a bilingual title and a plain category.
pub fn post(id: &str, title_en: &str, title_ru: &str, category: &str, date: &str) -> ContentItem {
    ContentItem {
        id: ContentId::from(id),
        title: LocalizedText::pair(title_en, title_ru),
        excerpt: LocalizedText::pair("", ""),
        body: LocalizedText::pair(format!("{title_en}."), ""),
        category: LocalizedText::plain(category),
        author: "Folio Editorial".to_string(),
        tags: Vec::new(),
        read_time: "5 min".to_string(),
        published_at: timestamp(date),
        tone: Tone::Neutral,
        featured: false,
        published: true,
    }
}

/// Midnight UTC on `date` (`YYYY-MM-DD`).
pub fn timestamp(date: &str) -> DateTime<Utc> {
    format!("{date}T00:00:00Z")
        .parse()
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

/// Two posts that exercise the search/category combination rules.
pub fn registration_and_banking() -> Vec<ContentItem> {
    vec![
        post(
            "offshore-registration",
            "Offshore Registration",
            "Офшорная регистрация",
            "Company Registration",
            "2026-01-02",
        ),
        post(
            "banking-options",
            "Banking Options",
            "Банковские решения",
            "Banking",
            "2026-01-01",
        ),
    ]
}

/// A realistic blog: mixed categories, tags, one featured post and a draft.
pub fn sample_blog() -> Vec<ContentItem> {
    let mut guide = post("cyprus-guide", "Guide", "", "Licensing", "2026-03-10");
    guide.featured = true;
    guide.tone = Tone::Blue;
    guide.tags = vec!["Cyprus".into(), "EMI".into()];
    guide.excerpt = LocalizedText::pair("How to obtain an EMI licence", "Как получить лицензию EMI");

    let mut accounts = post(
        "eu-accounts",
        "Opening EU accounts",
        "Открытие счетов в ЕС",
        "banking",
        "2026-03-08",
    );
    accounts.tone = Tone::Orange;
    accounts.category = LocalizedText::pair("banking", "банкинг");

    let mut draft = post("draft-notes", "Draft notes", "", "Banking", "2026-03-12");
    draft.published = false;

    let mut items = registration_and_banking();
    items.extend([
        guide,
        accounts,
        post("uae-free-zones", "UAE free zones", "Свободные зоны ОАЭ", "Company Registration", "2026-02-20"),
        post("crypto-rules", "Crypto rules in 2026", "Правила для крипты", "Licensing", "2026-02-14"),
        draft,
    ]);
    items
}
