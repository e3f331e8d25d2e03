use clap::{Args, Subcommand};
use mangashelf_lib::navigation::RELATED_LIMIT;
use mangashelf_lib::paging::{DEFAULT_CHAPTER_LIMIT, Pager};
use mangashelf_lib::prelude::*;
use mangashelf_store::{KeyValueStore, Library, MangaEntry};
use serde_json::{Value, json};

use crate::config::Config;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Recently added manga
    Latest(PageArgs),
    /// Most followed manga
    Popular(PageArgs),
    Search {
        query: String,
        #[clap(flatten)]
        page: PageArgs,
    },
    /// Popular manga tagged with a genre
    Genre {
        name: String,
        #[clap(flatten)]
        page: PageArgs,
    },
    /// List the genres offered for browsing
    Genres,
    /// A random popular manga and its first chapter
    Featured,
    Manga {
        id: String,
    },
    Chapters {
        manga_id: String,
        #[clap(flatten)]
        page: PageArgs,
        /// Keep loading until the feed is exhausted
        #[clap(long, conflicts_with_all = ["limit", "offset"])]
        all: bool,
    },
    Pages {
        chapter_id: String,
        /// Zero based page to show
        #[clap(long)]
        page: Option<usize>,
        #[clap(long)]
        data_saver: bool,
    },
    #[clap(subcommand)]
    Bookmark(ListAction),
    #[clap(subcommand)]
    Follow(ListAction),
    #[clap(subcommand)]
    Note(NoteAction),
    #[clap(subcommand)]
    Review(ReviewAction),
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct PageArgs {
    /// Defaults to `page_size` from the config file
    #[clap(long)]
    pub limit: Option<usize>,
    #[clap(long, default_value_t = 0)]
    pub offset: usize,
}

impl PageArgs {
    fn request(&self, default_limit: usize) -> PageRequest {
        PageRequest::new(self.limit.unwrap_or(default_limit), self.offset)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ListAction {
    List,
    Add { manga_id: String },
    Remove { manga_id: String },
    Toggle { manga_id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NoteAction {
    List { manga_id: String },
    Add { manga_id: String, text: String },
    Delete { manga_id: String, note_id: i64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ReviewAction {
    List {
        manga_id: String,
    },
    Add {
        manga_id: String,
        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        comment: String,
    },
    Delete {
        manga_id: String,
        review_id: i64,
    },
}

pub struct App<C, S> {
    catalogue: C,
    library: Library<S>,
    config: Config,
}

impl<C: Catalogue, S: KeyValueStore> App<C, S> {
    pub fn new(catalogue: C, library: Library<S>, config: Config) -> Self {
        Self {
            catalogue,
            library,
            config,
        }
    }

    pub async fn run(&self, command: Command) -> Result<Value> {
        let page_size = self.config.page_size;

        let value = match command {
            Command::Latest(page) => {
                let list = self.catalogue.latest(page.request(page_size)).await?;
                self.manga_list(list)
            }
            Command::Popular(page) => {
                let list = self.catalogue.popular(page.request(page_size)).await?;
                self.manga_list(list)
            }
            Command::Search { query, page } => {
                let list = self
                    .catalogue
                    .search(&query, page.request(page_size))
                    .await?;
                self.manga_list(list)
            }
            Command::Genre { name, page } => {
                let list = self
                    .catalogue
                    .by_genre(&name, page.request(page_size))
                    .await?;
                self.manga_list(list)
            }
            Command::Genres => json!(COMMON_GENRES),
            Command::Featured => self.featured().await?,
            Command::Manga { id } => self.manga(&id).await?,
            Command::Chapters {
                manga_id,
                page,
                all,
            } => {
                let chapters = if all {
                    self.all_chapters(&manga_id).await?
                } else {
                    self.catalogue
                        .manga_chapters(&manga_id, page.request(DEFAULT_CHAPTER_LIMIT))
                        .await?
                };
                let chapters: Vec<DisplayChapter> = chapters
                    .into_iter()
                    .map(|chapter| chapter.with_manga_id(&manga_id))
                    .collect();
                json!(chapters)
            }
            Command::Pages {
                chapter_id,
                page,
                data_saver,
            } => self.pages(&chapter_id, page, data_saver).await?,
            Command::Bookmark(action) => self.bookmark(action).await?,
            Command::Follow(action) => self.follow(action).await?,
            Command::Note(action) => self.note(action)?,
            Command::Review(action) => self.review(action)?,
        };

        Ok(value)
    }

    async fn featured(&self) -> Result<Value> {
        let Some(manga) = self.catalogue.featured().await? else {
            return Ok(Value::Null);
        };
        let first_chapter = self.catalogue.first_chapter(&manga.id).await?;

        Ok(json!({
            "manga": self.manga_value(manga),
            "firstChapter": first_chapter,
        }))
    }

    async fn manga(&self, id: &str) -> Result<Value> {
        let manga = self.catalogue.manga_details(id).await?;

        let candidates = self
            .catalogue
            .latest(PageRequest::new(RELATED_LIMIT, 0))
            .await
            .unwrap_or_else(|e| {
                warn!("failed to load related manga: {e}");
                vec![]
            });
        let related: Vec<Value> = related_manga(&manga, &candidates, RELATED_LIMIT)
            .into_iter()
            .map(|related| self.manga_value(related.clone()))
            .collect();

        Ok(json!({
            "bookmarked": self.library.is_bookmarked(id)?,
            "followed": self.library.is_followed(id)?,
            "manga": self.manga_value(manga),
            "related": related,
        }))
    }

    async fn all_chapters(&self, manga_id: &str) -> Result<Vec<DisplayChapter>> {
        let mut pager = Pager::new(DEFAULT_CHAPTER_LIMIT);
        let mut chapters = vec![];
        while let Some(page) = pager.next_request() {
            let batch = self.catalogue.manga_chapters(manga_id, page).await?;
            pager.record(batch.len());
            chapters.extend(batch);
        }
        Ok(chapters)
    }

    async fn pages(&self, chapter_id: &str, page: Option<usize>, data_saver: bool) -> Result<Value> {
        let pages = self.catalogue.chapter_pages(chapter_id).await?;
        let manga_id = manga_id_of(&pages.chapter).map(str::to_string);

        let urls: Vec<String> = if data_saver && !pages.data_saver.is_empty() {
            pages
                .data_saver
                .iter()
                .map(|file| pages.data_saver_url(file))
                .collect()
        } else {
            pages.page_urls()
        };

        let mut chapter = transform_chapter(&pages.chapter);
        let (mut previous, mut next) = (None, None);
        if let Some(manga_id) = &manga_id {
            chapter = chapter.with_manga_id(manga_id);
            let chapters = self.all_chapters(manga_id).await.unwrap_or_else(|e| {
                warn!("failed to load chapter list of {manga_id}: {e}");
                vec![]
            });
            let navigator = ChapterNavigator::new(&chapters, chapter_id);
            previous = navigator.previous_chapter().map(|c| c.id.clone());
            next = navigator.next_chapter().map(|c| c.id.clone());
        }

        let mut value = json!({
            "chapter": chapter,
            "previousChapter": previous,
            "nextChapter": next,
        });

        match page {
            Some(page) => {
                let mut cursor = PageCursor::new(urls.len());
                cursor.jump(page);
                value["page"] = json!(cursor.page());
                value["pageCount"] = json!(cursor.len());
                value["url"] = json!(urls.get(cursor.page()));
                value["isLast"] = json!(cursor.is_last());
            }
            None => value["pages"] = json!(urls),
        }

        Ok(value)
    }

    async fn bookmark(&self, action: ListAction) -> Result<Value> {
        let value = match action {
            ListAction::List => self.entry_list(self.library.bookmarks()?),
            ListAction::Add { manga_id } => {
                let entry = self.entry(&manga_id).await?;
                json!({ "added": self.library.add_bookmark(entry)? })
            }
            ListAction::Remove { manga_id } => {
                json!({ "removed": self.library.remove_bookmark(&manga_id)? })
            }
            ListAction::Toggle { manga_id } => {
                let entry = self.entry(&manga_id).await?;
                json!({ "bookmarked": self.library.toggle_bookmark(entry)? })
            }
        };
        Ok(value)
    }

    async fn follow(&self, action: ListAction) -> Result<Value> {
        let value = match action {
            ListAction::List => self.entry_list(self.library.followed()?),
            ListAction::Add { manga_id } => {
                let entry = self.entry(&manga_id).await?;
                json!({ "added": self.library.follow(entry)? })
            }
            ListAction::Remove { manga_id } => {
                json!({ "removed": self.library.unfollow(&manga_id)? })
            }
            ListAction::Toggle { manga_id } => {
                let entry = self.entry(&manga_id).await?;
                json!({ "followed": self.library.toggle_follow(entry)? })
            }
        };
        Ok(value)
    }

    fn note(&self, action: NoteAction) -> Result<Value> {
        match action {
            NoteAction::List { manga_id } => Ok(json!(self.library.notes(&manga_id)?)),
            NoteAction::Add { manga_id, text } => Ok(json!(self.library.add_note(&manga_id, &text)?)),
            NoteAction::Delete { manga_id, note_id } => {
                Ok(json!({ "removed": self.library.delete_note(&manga_id, note_id)? }))
            }
        }
    }

    fn review(&self, action: ReviewAction) -> Result<Value> {
        match action {
            ReviewAction::List { manga_id } => Ok(json!(self.library.reviews(&manga_id)?)),
            ReviewAction::Add {
                manga_id,
                rating,
                comment,
            } => Ok(json!(self.library.add_review(&manga_id, rating, &comment)?)),
            ReviewAction::Delete {
                manga_id,
                review_id,
            } => Ok(json!({ "removed": self.library.delete_review(&manga_id, review_id)? })),
        }
    }

    /// Library entries keep the relative cover path, output resolves it
    async fn entry(&self, manga_id: &str) -> Result<MangaEntry> {
        let manga = self.catalogue.manga_details(manga_id).await?;
        Ok(MangaEntry::from(&manga))
    }

    fn entry_list(&self, entries: Vec<MangaEntry>) -> Value {
        let entries: Vec<MangaEntry> = entries
            .into_iter()
            .map(|mut entry| {
                entry.cover = self.config.cover_url(&entry.cover);
                entry
            })
            .collect();
        json!({ "count": entries.len(), "entries": entries })
    }

    fn manga_list(&self, list: Vec<DisplayManga>) -> Value {
        Value::Array(list.into_iter().map(|m| self.manga_value(m)).collect())
    }

    fn manga_value(&self, mut manga: DisplayManga) -> Value {
        manga.cover = self.config.cover_url(&manga.cover);
        json!(manga)
    }
}
