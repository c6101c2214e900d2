pub mod fetch;
pub mod source;

pub use fetch::{expand_comment_forest, fetch_subreddit_data, FetchOptions};
pub use source::PostSource;
