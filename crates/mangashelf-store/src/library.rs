use std::collections::HashMap;

use chrono::Utc;
use mangashelf_lib::{
    error::{Error, Result},
    models::DisplayManga,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::store::KeyValueStore;

pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const FOLLOWED_KEY: &str = "followedManga";
pub const NOTES_KEY: &str = "mangaNotes";
pub const REVIEWS_KEY: &str = "mangaReviews";

/// Snapshot of a manga kept in the bookmark and follow lists
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MangaEntry {
    pub id: String,
    pub title: String,
    pub cover: String,
}

impl From<&DisplayManga> for MangaEntry {
    fn from(manga: &DisplayManga) -> Self {
        Self {
            id: manga.id.clone(),
            title: manga.title.clone(),
            cover: manga.cover.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    /// Creation time in milliseconds
    pub id: i64,
    pub text: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Review {
    pub id: i64,
    pub rating: u8,
    pub comment: String,
    pub date: String,
}

type PerManga<T> = HashMap<String, Vec<T>>;

/// Bookmarks, follows, notes and reviews on top of a [`KeyValueStore`].
///
/// Every operation reads the current value, changes it and writes it back;
/// concurrent writers to the same store overwrite each other.
pub struct Library<S> {
    store: S,
}

impl<S: KeyValueStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bookmarks(&self) -> Result<Vec<MangaEntry>> {
        self.load(BOOKMARKS_KEY)
    }

    pub fn bookmark_count(&self) -> Result<usize> {
        Ok(self.bookmarks()?.len())
    }

    pub fn is_bookmarked(&self, id: &str) -> Result<bool> {
        Ok(self.bookmarks()?.iter().any(|entry| entry.id == id))
    }

    /// Returns false if the manga was already bookmarked
    pub fn add_bookmark(&self, entry: MangaEntry) -> Result<bool> {
        self.add_entry(BOOKMARKS_KEY, entry)
    }

    /// Returns false if the manga was not bookmarked
    pub fn remove_bookmark(&self, id: &str) -> Result<bool> {
        self.remove_entry(BOOKMARKS_KEY, id)
    }

    /// Returns whether the manga is bookmarked afterwards
    pub fn toggle_bookmark(&self, entry: MangaEntry) -> Result<bool> {
        self.toggle_entry(BOOKMARKS_KEY, entry)
    }

    pub fn followed(&self) -> Result<Vec<MangaEntry>> {
        self.load(FOLLOWED_KEY)
    }

    pub fn followed_count(&self) -> Result<usize> {
        Ok(self.followed()?.len())
    }

    pub fn is_followed(&self, id: &str) -> Result<bool> {
        Ok(self.followed()?.iter().any(|entry| entry.id == id))
    }

    pub fn follow(&self, entry: MangaEntry) -> Result<bool> {
        self.add_entry(FOLLOWED_KEY, entry)
    }

    pub fn unfollow(&self, id: &str) -> Result<bool> {
        self.remove_entry(FOLLOWED_KEY, id)
    }

    pub fn toggle_follow(&self, entry: MangaEntry) -> Result<bool> {
        self.toggle_entry(FOLLOWED_KEY, entry)
    }

    pub fn notes(&self, manga_id: &str) -> Result<Vec<Note>> {
        let mut notes: PerManga<Note> = self.load(NOTES_KEY)?;
        Ok(notes.remove(manga_id).unwrap_or_default())
    }

    pub fn add_note(&self, manga_id: &str, text: &str) -> Result<Note> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("note text is empty".to_string()));
        }

        let mut notes: PerManga<Note> = self.load(NOTES_KEY)?;
        let list = notes.entry(manga_id.to_string()).or_default();
        let note = Note {
            id: next_id(list.last().map(|note| note.id)),
            text: text.to_string(),
            date: Utc::now().to_rfc3339(),
        };
        list.push(note.clone());

        self.save(NOTES_KEY, &notes)?;
        Ok(note)
    }

    /// Returns false if no note with `note_id` exists for the manga
    pub fn delete_note(&self, manga_id: &str, note_id: i64) -> Result<bool> {
        let mut notes: PerManga<Note> = self.load(NOTES_KEY)?;
        let Some(list) = notes.get_mut(manga_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|note| note.id != note_id);
        if list.len() == before {
            return Ok(false);
        }
        if list.is_empty() {
            notes.remove(manga_id);
        }

        self.save(NOTES_KEY, &notes)?;
        Ok(true)
    }

    pub fn reviews(&self, manga_id: &str) -> Result<Vec<Review>> {
        let mut reviews: PerManga<Review> = self.load(REVIEWS_KEY)?;
        Ok(reviews.remove(manga_id).unwrap_or_default())
    }

    pub fn add_review(&self, manga_id: &str, rating: u8, comment: &str) -> Result<Review> {
        if !(1..=5).contains(&rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        if comment.trim().is_empty() {
            return Err(Error::InvalidInput("review comment is empty".to_string()));
        }

        let mut reviews: PerManga<Review> = self.load(REVIEWS_KEY)?;
        let list = reviews.entry(manga_id.to_string()).or_default();
        let review = Review {
            id: next_id(list.last().map(|review| review.id)),
            rating,
            comment: comment.to_string(),
            date: Utc::now().to_rfc3339(),
        };
        list.push(review.clone());

        self.save(REVIEWS_KEY, &reviews)?;
        Ok(review)
    }

    pub fn delete_review(&self, manga_id: &str, review_id: i64) -> Result<bool> {
        let mut reviews: PerManga<Review> = self.load(REVIEWS_KEY)?;
        let Some(list) = reviews.get_mut(manga_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|review| review.id != review_id);
        if list.len() == before {
            return Ok(false);
        }
        if list.is_empty() {
            reviews.remove(manga_id);
        }

        self.save(REVIEWS_KEY, &reviews)?;
        Ok(true)
    }

    fn add_entry(&self, key: &str, entry: MangaEntry) -> Result<bool> {
        let mut entries: Vec<MangaEntry> = self.load(key)?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Ok(false);
        }

        entries.push(entry);
        self.save(key, &entries)?;
        Ok(true)
    }

    fn remove_entry(&self, key: &str, id: &str) -> Result<bool> {
        let mut entries: Vec<MangaEntry> = self.load(key)?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.save(key, &entries)?;
        Ok(true)
    }

    fn toggle_entry(&self, key: &str, entry: MangaEntry) -> Result<bool> {
        let id = entry.id.clone();
        if self.remove_entry(key, &id)? {
            Ok(false)
        } else {
            self.add_entry(key, entry)
        }
    }

    /// Read a value, treating a missing or unreadable one as empty
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(value) = self.store.get(key)? else {
            return Ok(T::default());
        };

        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("ignoring unreadable {key}: {e}");
            T::default()
        }))
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| Error::Store(e.to_string()))?;
        self.store.set(key, value)
    }
}

/// Millisecond timestamp id, bumped past `last` so ids stay unique when two
/// entries land in the same millisecond
fn next_id(last: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match last {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn entry(id: &str) -> MangaEntry {
        MangaEntry {
            id: id.to_string(),
            title: format!("Title {id}"),
            cover: format!("/uploads/covers/{id}/cover.jpg"),
        }
    }

    fn library() -> Library<MemoryStore> {
        Library::new(MemoryStore::new())
    }

    #[test]
    fn test_bookmark_add_remove_add_leaves_one() {
        let library = library();

        assert!(library.add_bookmark(entry("m1")).unwrap());
        assert!(library.remove_bookmark("m1").unwrap());
        assert!(library.add_bookmark(entry("m1")).unwrap());
        assert!(!library.add_bookmark(entry("m1")).unwrap());

        let bookmarks = library.bookmarks().unwrap();
        assert_eq!(bookmarks.iter().filter(|b| b.id == "m1").count(), 1);
        assert_eq!(library.bookmark_count().unwrap(), 1);
    }

    #[test]
    fn test_toggle_bookmark() {
        let library = library();

        assert!(library.toggle_bookmark(entry("m1")).unwrap());
        assert!(library.is_bookmarked("m1").unwrap());
        assert!(!library.toggle_bookmark(entry("m1")).unwrap());
        assert!(!library.is_bookmarked("m1").unwrap());
        assert!(!library.remove_bookmark("m1").unwrap());
    }

    #[test]
    fn test_persisted_shape() {
        let library = library();
        library.follow(entry("m2")).unwrap();

        assert_eq!(
            library.store().get(FOLLOWED_KEY).unwrap(),
            Some(json!([{"id": "m2", "title": "Title m2", "cover": "/uploads/covers/m2/cover.jpg"}]))
        );
        assert!(library.is_followed("m2").unwrap());
        assert!(!library.is_bookmarked("m2").unwrap());
        assert!(library.unfollow("m2").unwrap());
        assert_eq!(library.followed_count().unwrap(), 0);
    }

    #[test]
    fn test_entry_from_display_manga() {
        let raw = mangashelf_lib::models::RawManga {
            id: "m9".to_string(),
            ..Default::default()
        };
        let manga = mangashelf_lib::transform::transform_manga(&raw, false);
        let entry = MangaEntry::from(&manga);

        assert_eq!(entry.id, "m9");
        assert_eq!(entry.title, "Untitled");
        assert_eq!(entry.cover, manga.cover);
    }

    #[test]
    fn test_notes() {
        let library = library();

        let first = library.add_note("m1", "remember chapter 12").unwrap();
        let second = library.add_note("m1", "great art").unwrap();
        library.add_note("m2", "other manga").unwrap();
        assert!(second.id > first.id);

        let notes = library.notes("m1").unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].text, "remember chapter 12");

        assert!(library.delete_note("m1", first.id).unwrap());
        assert!(!library.delete_note("m1", first.id).unwrap());
        assert_eq!(library.notes("m1").unwrap(), vec![second]);
        assert_eq!(library.notes("m2").unwrap().len(), 1);
        assert!(library.notes("m3").unwrap().is_empty());
    }

    #[test]
    fn test_blank_note_rejected() {
        let library = library();
        assert!(matches!(
            library.add_note("m1", "   "),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(library.store().get(NOTES_KEY).unwrap(), None);
    }

    #[test]
    fn test_reviews() {
        let library = library();

        let review = library.add_review("m1", 4, "solid").unwrap();
        assert_eq!(review.rating, 4);
        assert!(matches!(
            library.add_review("m1", 0, "bad"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            library.add_review("m1", 6, "too good"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            library.add_review("m1", 3, ""),
            Err(Error::InvalidInput(_))
        ));

        assert_eq!(library.reviews("m1").unwrap(), vec![review.clone()]);
        assert!(library.delete_review("m1", review.id).unwrap());
        assert!(library.reviews("m1").unwrap().is_empty());
        assert_eq!(library.store().get(REVIEWS_KEY).unwrap(), Some(json!({})));
    }

    #[test]
    fn test_delete_for_unknown_manga_writes_nothing() {
        let library = library();

        assert!(!library.delete_note("nope", 1).unwrap());
        assert!(!library.delete_review("nope", 1).unwrap());
        assert_eq!(library.store().get(NOTES_KEY).unwrap(), None);
        assert_eq!(library.store().get(REVIEWS_KEY).unwrap(), None);

        let note = library.add_note("m1", "keep me").unwrap();
        assert!(!library.delete_note("m1", note.id + 1).unwrap());
        assert!(!library.delete_note("nope", note.id).unwrap());
        assert_eq!(
            library.store().get(NOTES_KEY).unwrap(),
            Some(serde_json::to_value(HashMap::from([("m1", vec![note])])).unwrap())
        );
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let library = library();
        library
            .store()
            .set(BOOKMARKS_KEY, json!({"not": "a list"}))
            .unwrap();

        assert!(library.bookmarks().unwrap().is_empty());
        assert!(library.add_bookmark(entry("m1")).unwrap());
        assert_eq!(library.bookmark_count().unwrap(), 1);
    }
}
