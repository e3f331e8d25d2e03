//! Records as the upstream API sends them.
//!
//! Every attribute is optional on the wire. Missing fields and explicit
//! `null`s both deserialize to defaults, so absent data never fails a parse.

use serde::{Deserialize, Deserializer, Serialize};

use super::LocalizedString;

pub const COVER_ART: &str = "cover_art";
pub const AUTHOR: &str = "author";
pub const ARTIST: &str = "artist";
pub const LAST_CHAPTER: &str = "last_chapter";
pub const MANGA: &str = "manga";

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A reference from one upstream entity to another, with the referenced
/// entity's attributes expanded inline when requested through `includes[]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Relationship {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

impl Relationship {
    pub fn new(kind: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// String attribute of the expanded entity, if present
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(key)?.as_str()
    }
}

pub fn find_relationship<'a>(
    relationships: &'a [Relationship],
    kind: &str,
) -> Option<&'a Relationship> {
    relationships.iter().find(|rel| rel.kind == kind)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TagAttributes {
    #[serde(default, deserialize_with = "nullable")]
    pub name: LocalizedString,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Tag {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: TagAttributes,
}

impl Tag {
    pub fn named(name: &str) -> Self {
        Self {
            id: String::new(),
            attributes: TagAttributes {
                name: LocalizedString::new().with("en", name),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default, deserialize_with = "nullable")]
    pub title: LocalizedString,
    #[serde(default, deserialize_with = "nullable")]
    pub alt_titles: Vec<LocalizedString>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: LocalizedString,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub last_chapter: Option<String>,
    #[serde(default)]
    pub followed_count: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A manga record from `GET /manga` or `GET /manga/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawManga {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: MangaAttributes,
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub translated_language: Option<String>,
    #[serde(default)]
    pub publish_at: Option<String>,
}

/// A chapter record from `GET /manga/{id}/feed` or `GET /chapter/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawChapter {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: ChapterAttributes,
    #[serde(default, deserialize_with = "nullable")]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    pub hash: String,
    #[serde(default, deserialize_with = "nullable")]
    pub data: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_saver: Vec<String>,
}

/// Page manifest from `GET /at-home/server/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeServer {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}
