use crate::comments::CommentListing;
use crate::metrics::{MetricsCollector, RequestMetrics};
use researcher_core::{CoreError, PostRecord, RedditApiError};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Largest page size the listing endpoints accept.
pub const MAX_LISTING_LIMIT: u32 = 100;

/// Largest number of ids `/api/morechildren` accepts per call.
pub const MAX_MORE_CHILDREN: usize = 100;

/// Comments returned with the initial thread request.
const COMMENT_LIMIT: &str = "500";
const COMMENT_SORT: &str = "confidence";

const NOT_FOUND_PREFIX: &str = "Resource not found: ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    pub upvote_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<crate::comments::CommentThing>,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    metrics: Arc<MetricsCollector>,
    base_url: String,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        Self::with_base_url(user_agent, REDDIT_API_BASE.to_string())
    }

    pub fn with_base_url(user_agent: String, base_url: String) -> Result<Self, CoreError> {
        let http_client = build_http_client(&user_agent)?;

        Ok(Self {
            http_client,
            metrics: Arc::new(MetricsCollector::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
        })
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let start_time = Instant::now();

        // Unescaped bodies instead of HTML entities
        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent)
            .query(&[("raw_json", "1")]);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let result = request_builder.send().await;

        let (status_code, outcome) = match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!("Request successful: {} {}", status, endpoint);
                    (Some(status.as_u16()), Ok(response))
                } else {
                    error!("Request failed with status: {} for {}", status, endpoint);
                    (Some(status.as_u16()), Err(status_error(&response, endpoint)))
                }
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    (None, Err(CoreError::RedditApi(RedditApiError::RequestTimeout)))
                } else {
                    (None, Err(CoreError::Network(e)))
                }
            }
        };

        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                status_code,
                response_time: start_time.elapsed(),
                success: outcome.is_ok(),
                rate_limited: status_code == Some(429),
            })
            .await;

        outcome
    }

    /// One page of the subreddit's "hot" listing.
    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let limit_str = limit.min(MAX_LISTING_LIMIT).to_string();
        let mut params = vec![("limit", limit_str.as_str())];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]))
            .await
            .map_err(|e| match e {
                CoreError::RedditApi(RedditApiError::InvalidResponse { ref details })
                    if details.starts_with(NOT_FOUND_PREFIX) =>
                {
                    CoreError::RedditApi(RedditApiError::SubredditNotFound {
                        subreddit: subreddit.to_string(),
                    })
                }
                other => other,
            })?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Comment listing for a post. The response is `[post listing, comment listing]`.
    pub async fn get_comments(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<CommentListing, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let params = [("limit", COMMENT_LIMIT), ("sort", COMMENT_SORT)];
        self.get_comment_listing(access_token, &endpoint, &params)
            .await
    }

    /// Thread rooted at `comment_id`, used for "continue this thread" links.
    pub async fn get_comment_thread(
        &self,
        access_token: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Result<CommentListing, CoreError> {
        let endpoint = format!("/comments/{}/_/{}", post_id, comment_id);
        let params = [("limit", COMMENT_LIMIT), ("sort", COMMENT_SORT)];
        self.get_comment_listing(access_token, &endpoint, &params)
            .await
    }

    async fn get_comment_listing(
        &self,
        access_token: &str,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<CommentListing, CoreError> {
        let response = self
            .make_request(Method::GET, endpoint, access_token, Some(params))
            .await?;

        let (_post, comments): (serde::de::IgnoredAny, CommentListing) =
            response.json().await.map_err(|e| {
                error!("Failed to parse comments: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse comments from {}", endpoint),
                })
            })?;

        debug!(
            "Retrieved {} top-level comment nodes from {}",
            comments.data.children.len(),
            endpoint
        );
        Ok(comments)
    }

    /// Resolves a batch of collapsed comment ids. `link_id` is the post fullname.
    pub async fn get_more_children(
        &self,
        access_token: &str,
        link_id: &str,
        children: &[String],
    ) -> Result<Vec<crate::comments::CommentThing>, CoreError> {
        let joined = children.join(",");
        let params = [
            ("api_type", "json"),
            ("link_id", link_id),
            ("children", joined.as_str()),
            ("sort", COMMENT_SORT),
        ];

        let response = self
            .make_request(Method::GET, "/api/morechildren", access_token, Some(&params[..]))
            .await?;

        let parsed: MoreChildrenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse morechildren response: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse more comments for {}", link_id),
            })
        })?;

        if !parsed.json.errors.is_empty() {
            warn!(
                "morechildren for {} returned errors: {:?}",
                link_id, parsed.json.errors
            );
            return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("morechildren rejected for {}", link_id),
            }));
        }

        let things = parsed.json.data.map(|d| d.things).unwrap_or_default();
        debug!("Expanded {} ids into {} things", children.len(), things.len());
        Ok(things)
    }

    pub async fn get_metrics(&self) -> crate::metrics::ApiMetrics {
        self.metrics.get_metrics().await
    }
}

pub(crate) fn build_http_client(user_agent: &str) -> Result<Client, CoreError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(CoreError::Network)
}

fn status_error(response: &Response, endpoint: &str) -> CoreError {
    let status = response.status();
    let api_error = match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditApiError::InvalidResponse {
            details: format!("{}{}", NOT_FOUND_PREFIX, endpoint),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    };
    CoreError::RedditApi(api_error)
}

impl From<RedditPostData> for PostRecord {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            post_id: post_data.id,
            title: post_data.title,
            score: post_data.score,
            upvote_ratio: post_data.upvote_ratio.unwrap_or_default(),
            url: post_data.url,
            num_comments: post_data.num_comments,
            created_utc: post_data.created_utc,
            all_comments: String::new(),
            summary: None,
            sentiment: None,
            sentiment_score: None,
        }
    }
}
