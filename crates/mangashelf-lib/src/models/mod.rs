pub mod localized;
pub use localized::*;

pub mod raw;
pub use raw::*;

pub mod manga;
pub use manga::*;

pub mod chapter;
pub use chapter::*;
