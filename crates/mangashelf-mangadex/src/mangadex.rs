use std::time::Duration;

use async_trait::async_trait;
use mangashelf_lib::prelude::*;
use rand::Rng;
use serde::de::DeserializeOwned;

use crate::query::{CONTENT_RATINGS, Direction, LANGUAGES, Query};
use crate::upstream::{HttpUpstream, Upstream};

/// `by_genre` filters the first `GENRE_WINDOW` popular titles client side;
/// matches ranked below the window are never found.
pub const GENRE_WINDOW: usize = 100;
/// `featured` picks one title among the first `FEATURED_WINDOW` popular ones
pub const FEATURED_WINDOW: usize = 100;

pub struct MangaDex<U = HttpUpstream> {
    upstream: U,
}

impl MangaDex<HttpUpstream> {
    pub fn connect(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::new(HttpUpstream::with_timeout(base_url, timeout)?))
    }
}

impl<U: Upstream> MangaDex<U> {
    pub fn new(upstream: U) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Featured title at a fixed offset of the popularity ranking
    pub async fn featured_at(&self, offset: usize) -> Result<Option<DisplayManga>> {
        let query = Query::new()
            .page(1, offset)
            .order("followedCount", Direction::Desc)
            .includes()
            .listing_filters();

        let manga = self.manga_list(query).await?;
        Ok(manga.first().map(|raw| transform_manga(raw, true)))
    }

    async fn manga_list(&self, query: Query) -> Result<Vec<RawManga>> {
        let body = self.upstream.get("/manga", &query).await?;
        data_list("/manga", body)
    }

    async fn list_page(
        &self,
        query: Query,
        page: PageRequest,
    ) -> Result<Vec<DisplayManga>> {
        let query = query
            .page(page.limit, page.offset)
            .includes()
            .listing_filters();
        let manga = self.manga_list(query).await?;

        Ok(manga.iter().map(|raw| transform_manga(raw, false)).collect())
    }

    async fn fetch_by_genre(&self, genre: &str, page: PageRequest) -> Result<Vec<DisplayManga>> {
        let query = Query::new()
            .page(GENRE_WINDOW, 0)
            .order("followedCount", Direction::Desc)
            .includes()
            .listing_filters();

        let manga = self
            .manga_list(query)
            .await?
            .iter()
            .map(|raw| transform_manga(raw, false))
            .filter(|manga| genre.is_empty() || manga.has_genre(genre))
            .collect::<Vec<_>>();

        Ok(page.apply(manga))
    }

    async fn fetch_manga_details(&self, id: &str) -> Result<DisplayManga> {
        let path = format!("/manga/{id}");
        let body = self.upstream.get(&path, &Query::new().includes()).await?;
        let raw: RawManga = data(&path, body)?;

        Ok(transform_manga(&raw, true))
    }

    async fn feed(&self, id: &str, query: Query) -> Result<Vec<RawChapter>> {
        let path = format!("/manga/{id}/feed");
        let body = self.upstream.get(&path, &query).await?;
        data_list(&path, body)
    }

    async fn fetch_manga_chapters(
        &self,
        id: &str,
        page: PageRequest,
    ) -> Result<Vec<DisplayChapter>> {
        let query = Query::new()
            .page(page.limit, page.offset)
            .order("chapter", Direction::Desc)
            .list("translatedLanguage", &LANGUAGES)
            .list("contentRating", &CONTENT_RATINGS);

        let chapters = self.feed(id, query).await?;
        Ok(chapters.iter().map(transform_chapter).collect())
    }

    async fn fetch_first_chapter(&self, id: &str) -> Result<Option<String>> {
        let query = Query::new()
            .param("limit", 1)
            .list("translatedLanguage", &LANGUAGES);

        let chapters = self.feed(id, query).await?;
        Ok(chapters.into_iter().next().map(|chapter| chapter.id))
    }

    async fn fetch_chapter_pages(&self, id: &str) -> Result<ChapterPages> {
        let chapter_path = format!("/chapter/{id}");
        let body = self.upstream.get(&chapter_path, &Query::new()).await?;
        let chapter: RawChapter = data(&chapter_path, body)?;

        let server_path = format!("/at-home/server/{id}");
        let body = self.upstream.get(&server_path, &Query::new()).await?;
        let server: AtHomeServer = decode(&server_path, check_result(&server_path, body)?)?;

        Ok(ChapterPages {
            chapter,
            pages: server.chapter.data,
            data_saver: server.chapter.data_saver,
            base_url: server.base_url,
            hash: server.chapter.hash,
        })
    }
}

#[async_trait]
impl<U: Upstream> Catalogue for MangaDex<U> {
    async fn latest(&self, page: PageRequest) -> Result<Vec<DisplayManga>> {
        let query = Query::new().order("createdAt", Direction::Desc);
        self.list_page(query, page)
            .await
            .inspect_err(|e| error!("error fetching latest manga: {e}"))
    }

    async fn popular(&self, page: PageRequest) -> Result<Vec<DisplayManga>> {
        let query = Query::new().order("followedCount", Direction::Desc);
        self.list_page(query, page)
            .await
            .inspect_err(|e| error!("error fetching popular manga: {e}"))
    }

    async fn search(&self, query: &str, page: PageRequest) -> Result<Vec<DisplayManga>> {
        let query = Query::new().param("title", query);
        self.list_page(query, page)
            .await
            .inspect_err(|e| error!("error searching manga: {e}"))
    }

    async fn by_genre(&self, genre: &str, page: PageRequest) -> Result<Vec<DisplayManga>> {
        self.fetch_by_genre(genre, page)
            .await
            .inspect_err(|e| error!("error fetching manga by genre {genre}: {e}"))
    }

    async fn featured(&self) -> Result<Option<DisplayManga>> {
        let offset = rand::rng().random_range(0..FEATURED_WINDOW);
        self.featured_at(offset)
            .await
            .inspect_err(|e| error!("error fetching featured manga: {e}"))
    }

    async fn manga_details(&self, id: &str) -> Result<DisplayManga> {
        self.fetch_manga_details(id)
            .await
            .inspect_err(|e| error!("error fetching manga details {id}: {e}"))
    }

    async fn manga_chapters(&self, id: &str, page: PageRequest) -> Result<Vec<DisplayChapter>> {
        self.fetch_manga_chapters(id, page)
            .await
            .inspect_err(|e| error!("error fetching manga chapters {id}: {e}"))
    }

    async fn first_chapter(&self, id: &str) -> Result<Option<String>> {
        self.fetch_first_chapter(id)
            .await
            .inspect_err(|e| error!("error fetching first chapter {id}: {e}"))
    }

    async fn chapter_pages(&self, id: &str) -> Result<ChapterPages> {
        self.fetch_chapter_pages(id)
            .await
            .inspect_err(|e| error!("error fetching chapter pages {id}: {e}"))
    }
}

/// Reject `{"result": "error", ...}` bodies
fn check_result(path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
    if body.get("result").and_then(|r| r.as_str()) == Some("error") {
        let detail = body
            .get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|error| error.get("detail").or_else(|| error.get("title")))
            .and_then(|detail| detail.as_str())
            .unwrap_or("upstream returned an error");
        return Err(Error::transport(path, detail));
    }

    Ok(body)
}

fn take_data(path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
    match check_result(path, body)? {
        serde_json::Value::Object(mut object) => object
            .remove("data")
            .ok_or_else(|| Error::unexpected_shape(path, "missing data")),
        _ => Err(Error::unexpected_shape(path, "expected an object")),
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::unexpected_shape(path, e))
}

fn data<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> Result<T> {
    decode(path, take_data(path, body)?)
}

fn data_list<T: DeserializeOwned>(path: &str, body: serde_json::Value) -> Result<Vec<T>> {
    let data = take_data(path, body)?;
    if !data.is_array() {
        return Err(Error::unexpected_shape(path, "expected an array"));
    }

    decode(path, data)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use super::*;

    #[derive(Default)]
    struct Fixture {
        manga: Vec<Value>,
        routes: HashMap<String, Value>,
        requests: Mutex<Vec<(String, Query)>>,
    }

    impl Fixture {
        fn with_manga(manga: Vec<Value>) -> Self {
            Self {
                manga,
                ..Default::default()
            }
        }

        fn route(mut self, path: &str, body: Value) -> Self {
            self.routes.insert(path.to_string(), body);
            self
        }

        fn requests(&self) -> Vec<(String, Query)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Upstream for Fixture {
        async fn get(&self, path: &str, query: &Query) -> Result<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), query.clone()));

            if let Some(body) = self.routes.get(path) {
                return Ok(body.clone());
            }

            if path == "/manga" {
                let limit: usize = query.get("limit").unwrap_or("10").parse().unwrap();
                let offset: usize = query.get("offset").unwrap_or("0").parse().unwrap();
                let data: Vec<Value> = self.manga.iter().skip(offset).take(limit).cloned().collect();
                return Ok(json!({"result": "ok", "response": "collection", "data": data}));
            }

            Err(Error::transport(path, "404 Not Found"))
        }
    }

    fn manga_record(i: usize, genres: &[&str]) -> Value {
        let tags: Vec<Value> = genres
            .iter()
            .map(|name| json!({"id": name, "type": "tag", "attributes": {"name": {"en": name}}}))
            .collect();

        json!({
            "id": format!("m{i}"),
            "type": "manga",
            "attributes": {
                "title": {"en": format!("Manga {i}")},
                "status": "ongoing",
                "tags": tags
            },
            "relationships": [
                {"id": format!("c{i}"), "type": "cover_art", "attributes": {"fileName": "cover.jpg"}}
            ]
        })
    }

    fn plain_source(len: usize) -> Vec<Value> {
        (0..len).map(|i| manga_record(i, &["Action"])).collect()
    }

    fn genre_source(len: usize) -> Vec<Value> {
        (0..len)
            .map(|i| {
                if i % 3 == 0 {
                    let romance = if i % 2 == 0 { "ROMANCE" } else { "Romance" };
                    manga_record(i, &["Drama", romance])
                } else {
                    manga_record(i, &["Action", "Comedy"])
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_latest_pagination_loop() {
        let mangadex = MangaDex::new(Fixture::with_manga(plain_source(45)));
        let mut pager = Pager::new(20);
        let mut lengths = vec![];
        let mut has_more = vec![];

        while let Some(request) = pager.next_request() {
            let page = mangadex.latest(request).await.unwrap();
            lengths.push(page.len());
            pager.record(page.len());
            has_more.push(pager.has_more());
        }

        assert_eq!(lengths, vec![20, 20, 5]);
        assert_eq!(has_more, vec![true, true, false]);

        let past_end = mangadex
            .latest(PageRequest::new(20, pager.offset()))
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_latest_query() {
        let mangadex = MangaDex::new(Fixture::with_manga(plain_source(3)));
        let manga = mangadex.latest(PageRequest::default()).await.unwrap();

        assert_eq!(manga[0].cover, "/uploads/covers/m0/cover.jpg");
        assert_eq!(manga[0].status, "Ongoing");

        let requests = mangadex.upstream().requests();
        let (path, query) = &requests[0];
        assert_eq!(path, "/manga");
        assert_eq!(query.get("limit"), Some("20"));
        assert_eq!(query.get("offset"), Some("0"));
        assert_eq!(query.get("order[createdAt]"), Some("desc"));
        assert_eq!(query.get_all("includes[]"), vec!["cover_art", "author", "artist"]);
        assert_eq!(query.get_all("availableTranslatedLanguage[]"), vec!["en"]);
    }

    #[tokio::test]
    async fn test_popular_and_search_query() {
        let mangadex = MangaDex::new(Fixture::with_manga(plain_source(3)));
        mangadex.popular(PageRequest::new(5, 10)).await.unwrap();
        mangadex
            .search("frieren", PageRequest::default())
            .await
            .unwrap();

        let requests = mangadex.upstream().requests();
        assert_eq!(requests[0].1.get("order[followedCount]"), Some("desc"));
        assert_eq!(requests[0].1.get("limit"), Some("5"));
        assert_eq!(requests[0].1.get("offset"), Some("10"));
        assert_eq!(requests[1].1.get("title"), Some("frieren"));
        assert_eq!(requests[1].1.get("order[followedCount]"), None);
    }

    #[tokio::test]
    async fn test_by_genre_filters_then_slices() {
        let mangadex = MangaDex::new(Fixture::with_manga(genre_source(100)));

        let first = mangadex
            .by_genre("Romance", PageRequest::new(20, 0))
            .await
            .unwrap();
        assert_eq!(first.len(), 20);
        assert!(first.iter().all(|m| m.has_genre("romance")));
        assert_eq!(first[0].id, "m0");
        assert_eq!(first[1].id, "m3");

        let second = mangadex
            .by_genre("romance", PageRequest::new(20, 20))
            .await
            .unwrap();
        assert_eq!(second.len(), 14);
        assert_eq!(second[0].id, "m60");
        assert!(second.iter().all(|m| m.has_genre("Romance")));

        for (path, query) in mangadex.upstream().requests() {
            assert_eq!(path, "/manga");
            assert_eq!(query.get("limit"), Some("100"));
            assert_eq!(query.get("offset"), Some("0"));
        }
    }

    #[tokio::test]
    async fn test_by_genre_window_is_fixed() {
        let mut source = plain_source(100);
        source.push(manga_record(100, &["Horror"]));
        let mangadex = MangaDex::new(Fixture::with_manga(source));

        let horror = mangadex
            .by_genre("Horror", PageRequest::default())
            .await
            .unwrap();
        assert!(horror.is_empty());
    }

    #[tokio::test]
    async fn test_by_genre_empty_keeps_all() {
        let mangadex = MangaDex::new(Fixture::with_manga(genre_source(30)));
        let all = mangadex.by_genre("", PageRequest::new(50, 0)).await.unwrap();
        assert_eq!(all.len(), 30);
    }

    #[tokio::test]
    async fn test_featured() {
        let mangadex = MangaDex::new(Fixture::with_manga(plain_source(100)));
        let featured = mangadex.featured_at(5).await.unwrap().unwrap();
        assert_eq!(featured.id, "m5");
        assert!(featured.details.is_some());

        assert!(mangadex.featured().await.unwrap().is_some());

        let empty = MangaDex::new(Fixture::default());
        assert_eq!(empty.featured().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_manga_details() {
        let fixture = Fixture::default().route(
            "/manga/m1",
            json!({"result": "ok", "data": manga_record(1, &["Romance"])}),
        );
        let mangadex = MangaDex::new(fixture);

        let manga = mangadex.manga_details("m1").await.unwrap();
        assert_eq!(manga.title, "Manga 1");
        assert_eq!(manga.details.unwrap().tags, vec!["Romance"]);
    }

    #[tokio::test]
    async fn test_manga_chapters() {
        let fixture = Fixture::default().route(
            "/manga/m1/feed",
            json!({"result": "ok", "data": [
                {"id": "c2", "attributes": {"chapter": "2", "title": "Second", "pages": 18, "translatedLanguage": "en"}},
                {"id": "c1", "attributes": {"chapter": "1", "title": null}}
            ]}),
        );
        let mangadex = MangaDex::new(fixture);

        let chapters = mangadex
            .manga_chapters("m1", PageRequest::new(100, 0))
            .await
            .unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Second");
        assert_eq!(chapters[1].title, "Chapter 1");
        assert!(chapters.iter().all(|chapter| chapter.manga_id.is_none()));

        let requests = mangadex.upstream().requests();
        assert_eq!(requests[0].1.get("order[chapter]"), Some("desc"));
        assert_eq!(requests[0].1.get_all("translatedLanguage[]"), vec!["en"]);

        assert_eq!(
            mangadex.first_chapter("m1").await.unwrap().as_deref(),
            Some("c2")
        );
    }

    #[tokio::test]
    async fn test_chapter_pages() {
        let fixture = Fixture::default()
            .route(
                "/chapter/c1",
                json!({"result": "ok", "data": {
                    "id": "c1",
                    "attributes": {"chapter": "1"},
                    "relationships": [{"id": "m1", "type": "manga"}]
                }}),
            )
            .route(
                "/at-home/server/c1",
                json!({
                    "result": "ok",
                    "baseUrl": "https://cdn",
                    "chapter": {"hash": "abc", "data": ["x1.png", "x2.png"], "dataSaver": []}
                }),
            );
        let mangadex = MangaDex::new(fixture);

        let pages = mangadex.chapter_pages("c1").await.unwrap();
        assert_eq!(pages.pages, vec!["x1.png", "x2.png"]);
        assert_eq!(pages.page_url("x1.png"), "https://cdn/data/abc/x1.png");
        assert_eq!(manga_id_of(&pages.chapter), Some("m1"));

        let paths: Vec<String> = mangadex
            .upstream()
            .requests()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(paths, vec!["/chapter/c1", "/at-home/server/c1"]);
    }

    #[tokio::test]
    async fn test_unexpected_shape() {
        let fixture = Fixture::default().route("/manga", json!({"result": "ok", "data": {"id": "m1"}}));
        let mangadex = MangaDex::new(fixture);

        let err = mangadex.latest(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape { .. }));
    }

    #[tokio::test]
    async fn test_upstream_error_body() {
        let fixture = Fixture::default().route(
            "/manga/missing",
            json!({"result": "error", "errors": [{"status": 404, "title": "Not Found", "detail": "Manga could not be found"}]}),
        );
        let mangadex = MangaDex::new(fixture);

        let err = mangadex.manga_details("missing").await.unwrap_err();
        assert_eq!(
            err,
            Error::transport("/manga/missing", "Manga could not be found")
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let mangadex = MangaDex::new(Fixture::default());
        let err = mangadex.chapter_pages("c9").await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
