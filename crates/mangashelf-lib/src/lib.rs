pub mod error;
pub mod models;
pub mod navigation;
pub mod paging;
pub mod prelude;
pub mod traits;
pub mod transform;

/// Crate version, sent as part of the user agent
pub static LIB_VERSION: &str = env!("CARGO_PKG_VERSION");
