use researcher_core::{
    AppConfig, ConfigError, CoreError, ErrorCategory, ErrorExt, ErrorReporter, RedditApiError,
    ReportError,
};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let config_error = CoreError::Config(ConfigError::MissingField {
        field: "research.subreddit".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let report_error = ReportError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "read-only",
    ));
    assert_eq!(report_error.error_code(), "REPORT_IO");
}

#[test]
fn test_error_categories() {
    let auth = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    assert_eq!(auth.category(), ErrorCategory::Authentication);
    assert_eq!(auth.category().to_string(), "AuthenticationError");

    let server = CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 });
    assert_eq!(server.category(), ErrorCategory::Network);
    assert_eq!(server.category().to_string(), "NetworkError");

    let report = ReportError::Io(std::io::Error::other("disk full"));
    assert_eq!(report.category(), ErrorCategory::Serialization);
    assert_eq!(report.category().to_string(), "SerializationError");

    let config: CoreError = ConfigError::MissingField {
        field: "research.subreddit".to_string(),
    }
    .into();
    assert_eq!(config.category().to_string(), "ConfigurationError");
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let not_found = CoreError::RedditApi(RedditApiError::SubredditNotFound {
        subreddit: "doesnotexist".to_string(),
    });
    assert!(not_found.user_friendly_message().contains("doesnotexist"));

    let config_error = CoreError::Config(ConfigError::FileNotFound {
        path: "missing.toml".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("missing.toml"));
}

#[test]
fn test_diagnostics_show_code_category_and_credential_flags() {
    let mut config = AppConfig::default();
    config.reddit.client_id = Some("my-client-id".to_string());
    config.reddit.password = Some("hunter2".to_string());

    let error = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    let text = ErrorReporter::new().diagnostics(&error, &config.credential_presence());

    assert!(text.contains("Authentication failed: invalid_grant"));
    assert!(text.contains("Error code: REDDIT_API (AuthenticationError)"));
    assert!(text.contains("Please check your credentials."));
    assert!(text.contains("  client_id: true\n"));
    assert!(text.contains("  client_secret: false\n"));
    assert!(text.contains("  username: false\n"));
    assert!(text.contains("  password: true\n"));
    assert!(text.contains("  user_agent: false\n"));
    assert!(!text.contains("my-client-id"));
    assert!(!text.contains("hunter2"));
}

#[test]
fn test_error_reporter() {
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // Logging only; must not panic
    ErrorReporter::new().report_error(&error);
}
