/// Query string parameters in the form the MangaDex API expects: array
/// values as repeated `key[]=value` pairs and ordering as
/// `order[field]=direction`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

pub const INCLUDES: [&str; 3] = ["cover_art", "author", "artist"];
pub const CONTENT_RATINGS: [&str; 3] = ["safe", "suggestive", "erotica"];
pub const LANGUAGES: [&str; 1] = ["en"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn list(mut self, key: &str, values: &[&str]) -> Self {
        let key = format!("{key}[]");
        for value in values {
            self.0.push((key.clone(), value.to_string()));
        }
        self
    }

    pub fn order(self, field: &str, direction: Direction) -> Self {
        self.param(&format!("order[{field}]"), direction.as_str())
    }

    pub fn page(self, limit: usize, offset: usize) -> Self {
        self.param("limit", limit).param("offset", offset)
    }

    /// Relationship expansion used by every manga request
    pub fn includes(self) -> Self {
        self.list("includes", &INCLUDES)
    }

    /// Content rating and language filters shared by list requests
    pub fn listing_filters(self) -> Self {
        self.list("contentRating", &CONTENT_RATINGS)
            .list("availableTranslatedLanguage", &LANGUAGES)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}
