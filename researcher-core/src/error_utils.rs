use crate::config::CredentialPresence;
use crate::error::*;
use std::fmt;
use tracing::{error, info};

/// Coarse failure classes reported to the user on fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Network,
    Serialization,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Authentication => "AuthenticationError",
            ErrorCategory::Network => "NetworkError",
            ErrorCategory::Serialization => "SerializationError",
            ErrorCategory::Configuration => "ConfigurationError",
        };
        f.write_str(name)
    }
}

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn category(&self) -> ErrorCategory;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Network(_) => {}
        }
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            CoreError::RedditApi(e) => e.category(),
            CoreError::Config(e) => e.category(),
            CoreError::Network(_) => ErrorCategory::Network,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(_) => "REDDIT_API".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        match self {
            RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken => {
                ErrorCategory::Authentication
            }
            _ => ErrorCategory::Network,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::SubredditNotFound { subreddit } => {
                format!("Subreddit '{}' not found or is private.", subreddit)
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-authenticate.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::SubredditNotFound { .. } => "REDDIT_SUBREDDIT_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::ServerError { .. } => "REDDIT_SERVER_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ReportError {
    fn log_error(&self) -> &Self {
        error!("ReportError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Serialization
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ReportError::Csv(_) => "Failed to write the CSV file.".to_string(),
            ReportError::Spreadsheet(_) => "Failed to write the spreadsheet file.".to_string(),
            ReportError::Io(e) => format!("Failed to write report file: {}", e),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ReportError::Csv(_) => "REPORT_CSV".to_string(),
            ReportError::Spreadsheet(_) => "REPORT_SPREADSHEET".to_string(),
            ReportError::Io(_) => "REPORT_IO".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

/// Presents fatal errors at the top level.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("Error type: {}", error.category());
        info!("User message: {}", error.user_friendly_message());
    }

    /// Console text for a fatal error. Credential values are never included,
    /// only whether each one is set.
    pub fn diagnostics(&self, error: &CoreError, credentials: &CredentialPresence) -> String {
        let mut out = format!(
            "An error occurred: {}\nError code: {} ({})\n{}\nCredentials present:\n",
            error,
            error.error_code(),
            error.category(),
            error.user_friendly_message()
        );
        for (name, present) in credentials.entries() {
            out.push_str(&format!("  {}: {}\n", name, present));
        }
        out
    }
}
