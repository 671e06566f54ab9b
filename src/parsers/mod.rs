pub mod html;


pub use html::extract_bookmarks;

/// Default number of bookmark links taken from each page
pub const DEFAULT_LINK_LIMIT: usize = 5;
