use serde::{Deserialize, Serialize};

use super::LocalizedString;

/// A type represent manga as shown in lists and on the detail page
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayManga {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub author: String,
    pub artist: String,
    pub status: String,
    /// Formatted follower count, e.g. `"2.5K"`
    pub views: String,
    /// Last chapter label, e.g. `"Ch. 12"`
    pub chapter: String,
    pub rating: String,
    pub genres: Vec<String>,
    pub is_new: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub details: Option<MangaDetails>,
}

/// Extra fields only the detail page shows
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaDetails {
    pub alt_titles: Vec<LocalizedString>,
    pub year: String,
    pub content_rating: String,
    pub tags: Vec<String>,
    pub last_updated: Option<String>,
}

impl DisplayManga {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres
            .iter()
            .any(|name| name.to_lowercase() == genre.to_lowercase())
    }
}
