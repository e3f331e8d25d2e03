#[macro_use]
extern crate log;

pub mod library;
pub mod store;

pub use library::{Library, MangaEntry, Note, Review};
pub use store::{FileStore, KeyValueStore, MemoryStore};
