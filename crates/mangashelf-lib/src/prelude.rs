pub use crate::error::{Error, Result};
pub use crate::models::*;
pub use crate::navigation::{COMMON_GENRES, ChapterNavigator, PageCursor, related_manga};
pub use crate::paging::{LoadSequence, LoadTicket, PageRequest, Pager};
pub use crate::traits::Catalogue;
pub use crate::transform::{manga_id_of, transform_chapter, transform_manga, transform_manga_at};
