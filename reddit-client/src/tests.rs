#[cfg(test)]
mod tests {
    use crate::api::RedditApiClient;
    use crate::comments::{CommentNode, MoreComments};
    use crate::{RedditClient, RedditCredentials, RedditSession, RedditToken};
    use researcher_core::{CoreError, RedditApiError, RedditConfig};
    use serde_json::{json, Value};
    use std::time::{Duration, SystemTime};
    use wiremock::matchers::{
        body_string_contains, header, header_exists, method, path, query_param,
        query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_AGENT: &str = "reddit-researcher/0.1 by test_user";

    fn create_test_credentials() -> RedditCredentials {
        RedditCredentials {
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            username: "test_user".to_string(),
            password: "hunter2".to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    fn valid_token() -> RedditToken {
        RedditToken {
            access_token: "tok".to_string(),
            expires_at: SystemTime::now() + Duration::from_secs(3600),
            scope: vec!["*".to_string()],
        }
    }

    fn session_for(server: &MockServer, token: RedditToken) -> RedditSession {
        let api = RedditApiClient::with_base_url(USER_AGENT.to_string(), server.uri()).unwrap();
        RedditSession::new(api, token)
    }

    fn post_json(id: &str) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": format!("Post {}", id),
                "url": format!("https://example.com/{}", id),
                "created_utc": 1700000000.0,
                "score": 10,
                "num_comments": 3,
                "upvote_ratio": 0.9
            }
        })
    }

    fn listing(children: Vec<Value>, after: Option<&str>) -> Value {
        json!({
            "kind": "Listing",
            "data": { "children": children, "after": after, "before": null }
        })
    }

    fn comment_json(id: &str, parent: &str, body: &str, replies: Value) -> Value {
        json!({
            "kind": "t1",
            "data": {
                "id": id,
                "name": format!("t1_{}", id),
                "parent_id": parent,
                "body": body,
                "replies": replies
            }
        })
    }

    #[test]
    fn test_credentials_from_config() {
        let config = RedditConfig {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            user_agent: Some("agent".to_string()),
            ..RedditConfig::default()
        };

        let credentials = RedditCredentials::from_config(&config).unwrap();
        assert_eq!(credentials.client_id, "id");
        assert_eq!(credentials.user_agent, "agent");
    }

    #[test]
    fn test_missing_credential_is_authentication_error() {
        let config = RedditConfig {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            username: Some("user".to_string()),
            password: Some("   ".to_string()),
            user_agent: Some("agent".to_string()),
            ..RedditConfig::default()
        };

        let result = RedditCredentials::from_config(&config);
        if let Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) = result {
            assert!(reason.contains("password"));
        } else {
            panic!("Expected AuthenticationFailed error");
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", create_test_credentials());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("test_client_secret"));

        let rendered = format!("{:?}", valid_token());
        assert!(!rendered.contains("\"tok\""));
    }

    #[test]
    fn test_token_serialization_and_expiry() {
        let token = RedditToken {
            access_token: "test_access_token".to_string(),
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1640995200),
            scope: vec!["identity".to_string(), "read".to_string()],
        };
        assert!(token.is_expired());
        assert!(!valid_token().is_expired());

        let serialized = serde_json::to_string(&token).unwrap();
        let deserialized: RedditToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.access_token, token.access_token);
        assert_eq!(deserialized.expires_at, token.expires_at);
        assert_eq!(deserialized.scope, token.scope);
    }

    #[tokio::test]
    async fn test_authenticate_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(header_exists("authorization"))
            .and(header("user-agent", USER_AGENT))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=test_user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "issued-token",
                "token_type": "bearer",
                "expires_in": 86400,
                "scope": "*"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            RedditClient::with_base_urls(create_test_credentials(), server.uri(), server.uri());
        let session = client.authenticate().await.unwrap();

        assert_eq!(session.token().access_token, "issued-token");
        assert!(!session.token().is_expired());
        assert_eq!(session.token().scope, vec!["*".to_string()]);
    }

    #[tokio::test]
    async fn test_authenticate_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let client =
            RedditClient::with_base_urls(create_test_credentials(), server.uri(), server.uri());
        let result = client.authenticate().await;

        if let Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) = result {
            assert!(reason.contains("invalid_grant"));
        } else {
            panic!("Expected AuthenticationFailed error");
        }
    }

    #[tokio::test]
    async fn test_hot_posts_follows_after_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/rust/hot"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param("raw_json", "1"))
            .and(query_param("limit", "5"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![post_json("a"), post_json("b")],
                Some("t3_b"),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/rust/hot"))
            .and(query_param("after", "t3_b"))
            .and(query_param("limit", "3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing(vec![post_json("c")], None)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let posts = session.hot_posts("rust", 5).await.unwrap();

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let metrics = session.get_api_metrics().await;
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.successful_requests, 2);
    }

    #[tokio::test]
    async fn test_hot_posts_truncates_to_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/rust/hot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                vec![post_json("sticky"), post_json("a")],
                Some("t3_a"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let posts = session.hot_posts("rust", 1).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "sticky");
    }

    #[tokio::test]
    async fn test_unknown_subreddit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/nosuchplace/hot"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let result = session.hot_posts("nosuchplace", 10).await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::SubredditNotFound { ref subreddit }))
                if subreddit == "nosuchplace"
        ));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/private/hot"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/busy/hot"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/down/hot"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        assert!(matches!(
            session.hot_posts("private", 1).await,
            Err(CoreError::RedditApi(RedditApiError::InvalidToken))
        ));
        assert!(matches!(
            session.hot_posts("busy", 1).await,
            Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 7 }))
        ));
        assert!(matches!(
            session.hot_posts("down", 1).await,
            Err(CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 }))
        ));

        let metrics = session.get_api_metrics().await;
        assert_eq!(metrics.failed_requests, 3);
        assert_eq!(metrics.rate_limited_requests, 1);
    }

    #[test]
    fn test_expired_token_short_circuits() {
        let expired = RedditToken {
            expires_at: SystemTime::now() - Duration::from_secs(1),
            ..valid_token()
        };
        let api = RedditApiClient::with_base_url(
            USER_AGENT.to_string(),
            "http://127.0.0.1:9".to_string(),
        )
        .unwrap();
        let session = RedditSession::new(api, expired);

        let result = tokio_test::block_on(session.hot_posts("rust", 1));
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::InvalidToken))
        ));
    }

    #[tokio::test]
    async fn test_comment_forest_and_more_children() {
        let server = MockServer::start().await;
        let comments = listing(
            vec![
                comment_json(
                    "a",
                    "t3_p",
                    "top",
                    listing(vec![comment_json("b", "t1_a", "reply", json!(""))], None),
                ),
                json!({"kind": "more", "data": {
                    "id": "c", "name": "t1_c", "parent_id": "t3_p",
                    "count": 2, "children": ["c", "d"], "depth": 0
                }}),
            ],
            None,
        );
        Mock::given(method("GET"))
            .and(path("/comments/p"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([listing(vec![post_json("p")], None), comments])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/morechildren"))
            .and(query_param("link_id", "t3_p"))
            .and(query_param("children", "c,d"))
            .and(query_param("api_type", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [], "data": {"things": [
                    comment_json("c", "t3_p", "third", json!("")),
                    comment_json("c1", "t1_c", "under third", json!("")),
                    comment_json("d", "t3_p", "fourth", json!(""))
                ]}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let mut forest = session.comment_forest("p").await.unwrap();
        assert_eq!(forest.bodies(), vec!["top", "reply"]);

        let more = forest.first_more().cloned().unwrap();
        let nodes = session.more_children(&forest, &more).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(forest.replace_more(&more.key(), nodes));

        assert!(!forest.has_more());
        assert_eq!(
            forest.bodies(),
            vec!["top", "third", "fourth", "reply", "under third"]
        );
    }

    #[tokio::test]
    async fn test_continue_thread_placeholder() {
        let server = MockServer::start().await;
        let thread = listing(
            vec![comment_json(
                "a",
                "t3_p",
                "deep parent",
                listing(
                    vec![comment_json("z", "t1_a", "deep reply", json!(""))],
                    None,
                ),
            )],
            None,
        );
        Mock::given(method("GET"))
            .and(path("/comments/p/_/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([listing(vec![post_json("p")], None), thread])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let forest = crate::comments::CommentForest::new("p", vec![]);
        let more = MoreComments {
            id: "_".to_string(),
            parent_id: "t1_a".to_string(),
            count: 0,
            children: vec![],
        };

        let nodes = session.more_children(&forest, &more).await.unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            CommentNode::Comment(comment) => assert_eq!(comment.body, "deep reply"),
            other => panic!("Expected comment, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_morechildren_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/morechildren"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {"errors": [["TOO_MANY", "too many ids", "children"]]}
            })))
            .mount(&server)
            .await;

        let session = session_for(&server, valid_token());
        let forest = crate::comments::CommentForest::new("p", vec![]);
        let more = MoreComments {
            id: "c".to_string(),
            parent_id: "t3_p".to_string(),
            count: 1,
            children: vec!["c".to_string()],
        };

        let result = session.more_children(&forest, &more).await;
        assert!(matches!(
            result,
            Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
        ));
    }
}
