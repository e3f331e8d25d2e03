#[macro_use]
extern crate log;

pub mod mangadex;
pub mod query;
pub mod upstream;

pub use mangadex::MangaDex;
pub use query::Query;
pub use upstream::{HttpUpstream, Upstream};

pub const DEFAULT_BASE_URL: &str = "https://api.mangadex.org";
