use crate::source::PostSource;
use reddit_client::comments::CommentForest;
use researcher_core::{CoreError, PostRecord, ResearchConfig, COMMENT_SEPARATOR};
use std::collections::HashSet;
use std::time::Duration;
use text_enrichment::TextEnricher;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub subreddit: String,
    pub limit: u32,
    /// Slept after every post, however fast the requests were.
    pub post_delay: Duration,
    pub summarize: bool,
    pub sentiment: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&ResearchConfig::default())
    }
}

impl From<&ResearchConfig> for FetchOptions {
    fn from(config: &ResearchConfig) -> Self {
        Self {
            subreddit: config.subreddit.clone(),
            limit: config.limit,
            post_delay: Duration::from_millis(config.post_delay_ms),
            summarize: config.summarize,
            sentiment: config.sentiment,
        }
    }
}

/// Fetches hot posts with their full comment text and enrichment.
///
/// Any failure aborts the whole run; records collected so far are dropped.
pub async fn fetch_subreddit_data<S, E>(
    source: &S,
    enricher: &E,
    options: &FetchOptions,
) -> Result<Vec<PostRecord>, CoreError>
where
    S: PostSource,
    E: TextEnricher,
{
    info!(
        "Fetching top {} posts from r/{}...",
        options.limit, options.subreddit
    );
    let posts = source.hot_posts(&options.subreddit, options.limit).await?;

    let mut seen = HashSet::with_capacity(posts.len());
    let mut records = Vec::with_capacity(posts.len());

    for post in posts {
        if !seen.insert(post.id.clone()) {
            debug!("Skipping duplicate post {}", post.id);
            continue;
        }

        let mut forest = source.comment_forest(&post.id).await?;
        let expansions = expand_comment_forest(source, &mut forest).await?;
        let bodies = forest.bodies();
        debug!(
            "Post {} has {} comments after {} expansions",
            post.id,
            bodies.len(),
            expansions
        );

        let mut record = PostRecord::from(post);
        record.all_comments = bodies.join(COMMENT_SEPARATOR);

        if options.summarize {
            record.apply_summary(enricher.summarize(&record.all_comments));
        }
        if options.sentiment {
            record.apply_sentiment(enricher.score_sentiment(&record.all_comments));
        }

        info!("Processed post: {}", record.title);
        records.push(record);

        tokio::time::sleep(options.post_delay).await;
    }

    info!("Finished fetching data for {} posts.", records.len());
    Ok(records)
}

/// Replaces every "load more" placeholder until none remain. Returns the
/// number of placeholders resolved through the source.
///
/// A placeholder that comes back after being resolved is dropped so the loop
/// always terminates.
pub async fn expand_comment_forest<S>(
    source: &S,
    forest: &mut CommentForest,
) -> Result<usize, CoreError>
where
    S: PostSource,
{
    let mut resolved = HashSet::new();

    while let Some(more) = forest.first_more().cloned() {
        let key = more.key();
        let replacement = if resolved.insert(key.clone()) {
            source.more_children(forest, &more).await?
        } else {
            warn!("Placeholder {} reappeared, dropping it", key);
            Vec::new()
        };
        forest.replace_more(&key, replacement);
    }

    Ok(resolved.len())
}
