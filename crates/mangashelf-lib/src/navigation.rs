use crate::models::{DisplayChapter, DisplayManga};

/// Genres offered by the genre browser
pub const COMMON_GENRES: [&str; 12] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Slice of Life",
    "Sports",
    "Supernatural",
];

pub const RELATED_LIMIT: usize = 6;

/// Moves between chapters of a chapter list ordered newest first, the order
/// the chapter feed returns.
#[derive(Debug, Clone)]
pub struct ChapterNavigator<'a> {
    chapters: &'a [DisplayChapter],
    current: Option<usize>,
}

impl<'a> ChapterNavigator<'a> {
    pub fn new(chapters: &'a [DisplayChapter], current_id: &str) -> Self {
        let current = chapters.iter().position(|chapter| chapter.id == current_id);
        Self { chapters, current }
    }

    pub fn current(&self) -> Option<&'a DisplayChapter> {
        self.chapters.get(self.current?)
    }

    /// The chapter before the current one in reading order
    pub fn previous_chapter(&self) -> Option<&'a DisplayChapter> {
        self.chapters.get(self.current? + 1)
    }

    /// The chapter after the current one in reading order
    pub fn next_chapter(&self) -> Option<&'a DisplayChapter> {
        self.chapters.get(self.current?.checked_sub(1)?)
    }
}

/// Position inside a chapter's pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    len: usize,
}

impl PageCursor {
    pub fn new(len: usize) -> Self {
        Self { page: 0, len }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.len == 0 || self.page == self.len - 1
    }

    /// Go to the previous page, returns false when already on the first one
    pub fn prev_page(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Go to the next page, returns false when already on the last one
    pub fn next_page(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn jump(&mut self, page: usize) {
        self.page = page.min(self.len.saturating_sub(1));
    }
}

/// Manga from `candidates` sharing at least one genre with `target`
pub fn related_manga<'a>(
    target: &DisplayManga,
    candidates: &'a [DisplayManga],
    max: usize,
) -> Vec<&'a DisplayManga> {
    candidates
        .iter()
        .filter(|manga| manga.id != target.id)
        .filter(|manga| manga.genres.iter().any(|genre| target.genres.contains(genre)))
        .take(max)
        .collect()
}
