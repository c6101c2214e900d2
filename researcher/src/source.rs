use reddit_client::api::RedditPostData;
use reddit_client::comments::{CommentForest, CommentNode, MoreComments};
use reddit_client::RedditSession;
use researcher_core::CoreError;

/// Where the fetch loop reads posts and comment trees from.
pub trait PostSource {
    async fn hot_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError>;

    async fn comment_forest(&self, post_id: &str) -> Result<CommentForest, CoreError>;

    async fn more_children(
        &self,
        forest: &CommentForest,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, CoreError>;
}

impl PostSource for RedditSession {
    async fn hot_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        RedditSession::hot_posts(self, subreddit, limit).await
    }

    async fn comment_forest(&self, post_id: &str) -> Result<CommentForest, CoreError> {
        RedditSession::comment_forest(self, post_id).await
    }

    async fn more_children(
        &self,
        forest: &CommentForest,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, CoreError> {
        RedditSession::more_children(self, forest, more).await
    }
}
