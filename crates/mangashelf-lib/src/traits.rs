use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChapterPages, DisplayChapter, DisplayManga};
use crate::paging::PageRequest;

/// A source of manga lists, details, chapters and pages.
///
/// List operations return at most `page.limit` items; a page shorter than the
/// limit means there is nothing more to load.
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// Most recently created titles
    async fn latest(&self, page: PageRequest) -> Result<Vec<DisplayManga>>;

    /// Titles ordered by follower count
    async fn popular(&self, page: PageRequest) -> Result<Vec<DisplayManga>>;

    async fn search(&self, query: &str, page: PageRequest) -> Result<Vec<DisplayManga>>;

    async fn by_genre(&self, genre: &str, page: PageRequest) -> Result<Vec<DisplayManga>>;

    /// A single popular title picked at random, `None` if there is none
    async fn featured(&self) -> Result<Option<DisplayManga>>;

    async fn manga_details(&self, id: &str) -> Result<DisplayManga>;

    async fn manga_chapters(&self, id: &str, page: PageRequest) -> Result<Vec<DisplayChapter>>;

    /// Id of the first chapter in the feed, used to start reading
    async fn first_chapter(&self, id: &str) -> Result<Option<String>>;

    async fn chapter_pages(&self, id: &str) -> Result<ChapterPages>;
}
