//! Cursor-based incremental feed loading

mod cursor;
mod paginator;

pub use cursor::FeedCursor;
pub use paginator::{FeedPage, FeedPaginator};
