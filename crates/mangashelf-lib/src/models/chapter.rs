use serde::{Deserialize, Serialize};

use super::RawChapter;

/// A type represent chapter in a manga's chapter list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayChapter {
    pub id: String,
    /// Chapter number as sent upstream, may be non numeric like `"10.5"`
    pub chapter: String,
    pub title: String,
    pub pages: u32,
    pub published_at: Option<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manga_id: Option<String>,
}

impl DisplayChapter {
    pub fn with_manga_id(mut self, manga_id: &str) -> Self {
        self.manga_id = Some(manga_id.to_string());
        self
    }
}

/// Everything the reader needs to show a chapter's pages
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPages {
    pub chapter: RawChapter,
    pub pages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_saver: Vec<String>,
    pub base_url: String,
    pub hash: String,
}

impl ChapterPages {
    pub fn page_url(&self, filename: &str) -> String {
        format!("{}/data/{}/{}", self.base_url, self.hash, filename)
    }

    pub fn data_saver_url(&self, filename: &str) -> String {
        format!("{}/data-saver/{}/{}", self.base_url, self.hash, filename)
    }

    /// Image urls of every page in reading order
    pub fn page_urls(&self) -> Vec<String> {
        self.pages.iter().map(|page| self.page_url(page)).collect()
    }
}
