pub mod api;
pub mod comments;
pub mod metrics;

mod tests;

use api::{build_http_client, RedditApiClient, RedditPostData, MAX_MORE_CHILDREN};
use comments::{assemble_subtree, CommentForest, CommentNode, MoreComments};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use researcher_core::{CoreError, RedditApiError, RedditConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

pub const REDDIT_AUTH_BASE: &str = "https://www.reddit.com";

/// The five values needed for a script-app password grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl RedditCredentials {
    /// Missing or empty values fail as an authentication error.
    pub fn from_config(config: &RedditConfig) -> Result<Self, CoreError> {
        fn required(value: &Option<String>, name: &str) -> Result<String, CoreError> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                    reason: format!("missing credential: {}", name),
                })),
            }
        }

        Ok(Self {
            client_id: required(&config.client_id, "client_id")?,
            client_secret: required(&config.client_secret, "client_secret")?,
            username: required(&config.username, "username")?,
            password: required(&config.password, "password")?,
            user_agent: required(&config.user_agent, "user_agent")?,
        })
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl fmt::Debug for RedditToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expires_at
    }
}

pub struct RedditClient {
    credentials: RedditCredentials,
    auth_base_url: String,
    api_base_url: String,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Self {
        Self::with_base_urls(
            credentials,
            REDDIT_AUTH_BASE.to_string(),
            api::REDDIT_API_BASE.to_string(),
        )
    }

    pub fn with_base_urls(
        credentials: RedditCredentials,
        auth_base_url: String,
        api_base_url: String,
    ) -> Self {
        Self {
            credentials,
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            api_base_url,
        }
    }

    pub fn from_config(config: &RedditConfig) -> Result<Self, CoreError> {
        let credentials = RedditCredentials::from_config(config)?;
        Ok(Self::with_base_urls(
            credentials,
            config.auth_base_url.clone(),
            config.api_base_url.clone(),
        ))
    }

    /// Exchanges username and password for a bearer token.
    pub async fn authenticate(&self) -> Result<RedditSession, CoreError> {
        let credentials = &self.credentials;
        info!(
            "Authenticating with Reddit as {} (client {})",
            credentials.username, credentials.client_id
        );

        let auth_url = AuthUrl::new(format!("{}/api/v1/authorize", self.auth_base_url))
            .map_err(|e| invalid_url("auth", e))?;
        let token_url = TokenUrl::new(format!("{}/api/v1/access_token", self.auth_base_url))
            .map_err(|e| invalid_url("token", e))?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        let http_client = build_http_client(&credentials.user_agent)?;
        let token_response = oauth_client
            .exchange_password(
                &ResourceOwnerUsername::new(credentials.username.clone()),
                &ResourceOwnerPassword::new(credentials.password.clone()),
            )
            .request_async(move |request| send_token_request(http_client, request))
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => {
                    error!("Token request rejected: {}", response);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                        reason: response.to_string(),
                    })
                }
                RequestTokenError::Request(e) => {
                    error!("Token request failed: {}", e);
                    CoreError::Network(e)
                }
                // Reddit answers bad credentials with `200 {"error": "invalid_grant"}`
                RequestTokenError::Parse(_, body) => {
                    let body = String::from_utf8_lossy(&body).into_owned();
                    error!("Unexpected token response: {}", body);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason: body })
                }
                RequestTokenError::Other(reason) => {
                    error!("Token request failed: {}", reason);
                    CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
                }
            })?;

        let expires_in = token_response
            .expires_in()
            .unwrap_or_else(|| Duration::from_secs(3600));
        let token = RedditToken {
            access_token: token_response.access_token().secret().clone(),
            expires_at: SystemTime::now() + expires_in,
            scope: token_response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        };
        info!("Authenticated, token valid for {:?}", expires_in);

        let api = RedditApiClient::with_base_url(
            credentials.user_agent.clone(),
            self.api_base_url.clone(),
        )?;
        Ok(RedditSession { api, token })
    }
}

fn invalid_url(kind: &str, e: url::ParseError) -> CoreError {
    CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: format!("invalid {} url: {}", kind, e),
    })
}

async fn send_token_request(
    http_client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

/// An authenticated connection to the Reddit API.
#[derive(Debug)]
pub struct RedditSession {
    api: RedditApiClient,
    token: RedditToken,
}

impl RedditSession {
    pub fn new(api: RedditApiClient, token: RedditToken) -> Self {
        Self { api, token }
    }

    pub fn token(&self) -> &RedditToken {
        &self.token
    }

    fn access_token(&self) -> Result<&str, CoreError> {
        if self.token.is_expired() {
            warn!("Access token expired at {:?}", self.token.expires_at);
            return Err(CoreError::RedditApi(RedditApiError::InvalidToken));
        }
        Ok(&self.token.access_token)
    }

    /// Up to `limit` posts in "hot" order, following `after` cursors.
    pub async fn hot_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let access_token = self.access_token()?;
        let wanted = limit as usize;
        let mut posts: Vec<RedditPostData> = Vec::with_capacity(wanted);
        let mut after: Option<String> = None;

        while posts.len() < wanted {
            let remaining = (wanted - posts.len()) as u32;
            let listing = self
                .api
                .get_subreddit_posts(access_token, subreddit, remaining, after.as_deref())
                .await?;

            let page_len = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().map(|child| child.data));
            after = listing.data.after;

            if page_len == 0 || after.is_none() {
                break;
            }
        }

        posts.truncate(wanted);
        debug!("Collected {} hot posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    /// The post's comment tree as first returned, placeholders included.
    pub async fn comment_forest(&self, post_id: &str) -> Result<CommentForest, CoreError> {
        let access_token = self.access_token()?;
        let listing = self.api.get_comments(access_token, post_id).await?;
        Ok(CommentForest::from_listing(post_id, listing))
    }

    /// Resolves one placeholder into the nodes that replace it.
    pub async fn more_children(
        &self,
        forest: &CommentForest,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, CoreError> {
        let access_token = self.access_token()?;

        if more.is_continue_thread() {
            let Some(parent_comment) = more.parent_comment_id() else {
                return Ok(Vec::new());
            };
            let listing = self
                .api
                .get_comment_thread(access_token, forest.post_id(), parent_comment)
                .await?;

            let replies = listing
                .into_nodes()
                .into_iter()
                .find_map(|node| match node {
                    CommentNode::Comment(comment) if comment.name == more.parent_id => {
                        Some(comment.replies)
                    }
                    _ => None,
                })
                .unwrap_or_default();
            return Ok(replies);
        }

        let mut flat = Vec::with_capacity(more.children.len());
        for chunk in more.children.chunks(MAX_MORE_CHILDREN) {
            let things = self
                .api
                .get_more_children(access_token, &forest.link_id, chunk)
                .await?;
            flat.extend(things.into_iter().map(CommentNode::from));
        }

        Ok(assemble_subtree(flat, &more.parent_id))
    }

    pub async fn get_api_metrics(&self) -> metrics::ApiMetrics {
        self.api.get_metrics().await
    }
}
