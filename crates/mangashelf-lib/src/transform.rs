//! Mapping from upstream records to display models.
//!
//! Nothing here fails: every missing field degrades to a default.

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    ARTIST, AUTHOR, COVER_ART, DisplayChapter, DisplayManga, LAST_CHAPTER, LocalizedString, MANGA,
    MangaDetails, RawChapter, RawManga, Relationship, Tag, find_relationship,
};

pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/300x400?text=No+Cover";
pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNKNOWN_YEAR: &str = "Unknown";
pub const DESCRIPTION_LIMIT: usize = 150;
pub const GENRE_LIMIT: usize = 3;
/// A manga created within this many days counts as new
pub const NEW_WINDOW_DAYS: i64 = 30;

pub fn transform_manga(raw: &RawManga, detailed: bool) -> DisplayManga {
    transform_manga_at(raw, detailed, Utc::now())
}

/// Same as [`transform_manga`] with the instant used for the `is_new` rule
/// passed in explicitly.
pub fn transform_manga_at(raw: &RawManga, detailed: bool, now: DateTime<Utc>) -> DisplayManga {
    let attributes = &raw.attributes;

    let author = relationship_name(&raw.relationships, AUTHOR)
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let artist = relationship_name(&raw.relationships, ARTIST)
        .map(str::to_string)
        .unwrap_or_else(|| author.clone());

    let rating = capitalize(attributes.content_rating.as_deref().unwrap_or("safe"));

    let details = detailed.then(|| MangaDetails {
        alt_titles: attributes.alt_titles.clone(),
        year: attributes
            .year
            .map_or_else(|| UNKNOWN_YEAR.to_string(), |year| year.to_string()),
        content_rating: rating.clone(),
        tags: tag_names(&attributes.tags).collect(),
        last_updated: attributes.updated_at.clone(),
    });

    DisplayManga {
        id: raw.id.clone(),
        title: resolve_title(&attributes.title),
        description: attributes
            .description
            .english()
            .map(truncate_description)
            .unwrap_or_default(),
        cover: cover_url(&raw.id, &raw.relationships),
        author,
        artist,
        status: capitalize(attributes.status.as_deref().unwrap_or("unknown")),
        views: format_follow_count(attributes.followed_count.unwrap_or(0)),
        chapter: last_chapter_label(raw),
        rating,
        genres: tag_names(&attributes.tags).take(GENRE_LIMIT).collect(),
        is_new: is_new(attributes.created_at.as_deref(), now),
        details,
    }
}

pub fn transform_chapter(raw: &RawChapter) -> DisplayChapter {
    let attributes = &raw.attributes;
    let chapter = attributes
        .chapter
        .clone()
        .filter(|number| !number.is_empty())
        .unwrap_or_else(|| "0".to_string());

    DisplayChapter {
        id: raw.id.clone(),
        title: attributes
            .title
            .clone()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("Chapter {chapter}")),
        chapter,
        pages: attributes.pages.unwrap_or(0),
        published_at: attributes.publish_at.clone(),
        language: attributes
            .translated_language
            .clone()
            .unwrap_or_else(|| "en".to_string()),
        manga_id: None,
    }
}

/// Id of the manga a chapter belongs to, taken from its `manga` relationship
pub fn manga_id_of(chapter: &RawChapter) -> Option<&str> {
    find_relationship(&chapter.relationships, MANGA)
        .map(|rel| rel.id.as_str())
        .filter(|id| !id.is_empty())
}

pub fn resolve_title(title: &LocalizedString) -> String {
    title
        .english()
        .or_else(|| title.first())
        .unwrap_or(UNTITLED)
        .to_string()
}

pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let mut truncated: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        truncated.push_str("...");
        truncated
    } else {
        description.to_string()
    }
}

pub fn cover_url(manga_id: &str, relationships: &[Relationship]) -> String {
    find_relationship(relationships, COVER_ART)
        .and_then(|cover| cover.attr_str("fileName"))
        .filter(|file_name| !file_name.is_empty())
        .map_or_else(
            || PLACEHOLDER_COVER.to_string(),
            |file_name| format!("/uploads/covers/{manga_id}/{file_name}"),
        )
}

/// Counts from 1000 up are shown in thousands to one decimal, halves round up
pub fn format_follow_count(count: u64) -> String {
    if count >= 1000 {
        let tenths = (count + 50) / 100;
        format!("{}.{}K", tenths / 10, tenths % 10)
    } else {
        count.to_string()
    }
}

/// Upper-case the first letter, `"ongoing"` becomes `"Ongoing"`
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_new(created_at: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(created_at) = created_at.and_then(|at| DateTime::parse_from_rfc3339(at).ok()) else {
        return false;
    };

    let age = now.signed_duration_since(created_at.with_timezone(&Utc));
    age >= Duration::zero() && age <= Duration::days(NEW_WINDOW_DAYS)
}

fn relationship_name<'a>(relationships: &'a [Relationship], kind: &str) -> Option<&'a str> {
    find_relationship(relationships, kind)
        .and_then(|rel| rel.attr_str("name"))
        .filter(|name| !name.is_empty())
}

fn tag_names(tags: &[Tag]) -> impl Iterator<Item = String> + '_ {
    tags.iter()
        .filter_map(|tag| tag.attributes.name.english())
        .map(str::to_string)
}

fn last_chapter_label(raw: &RawManga) -> String {
    let number = find_relationship(&raw.relationships, LAST_CHAPTER)
        .and_then(|rel| rel.attr_str("chapter"))
        .or(raw.attributes.last_chapter.as_deref())
        .filter(|number| !number.is_empty())
        .unwrap_or("N/A");
    format!("Ch. {number}")
}
