//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then the
//! `REDDIT_*` / `RESEARCH_*` environment variables. Command-line flags are
//! applied on top by the binary.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "REDDIT_USERNAME";
pub const ENV_PASSWORD: &str = "REDDIT_PASSWORD";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const ENV_SUBREDDIT: &str = "RESEARCH_SUBREDDIT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reddit: RedditConfig,
    pub research: ResearchConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
    pub api_base_url: String,
    pub auth_base_url: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            user_agent: None,
            api_base_url: "https://oauth.reddit.com".to_string(),
            auth_base_url: "https://www.reddit.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub subreddit: String,
    pub limit: u32,
    pub post_delay_ms: u64,
    pub output_dir: PathBuf,
    pub summarize: bool,
    pub sentiment: bool,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            subreddit: "datascience".to_string(),
            limit: 25,
            post_delay_ms: 200,
            output_dir: PathBuf::from("."),
            summarize: true,
            sentiment: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub summary_sentences: usize,
    pub max_input_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            summary_sentences: 3,
            max_input_chars: 100_000,
        }
    }
}

/// Which of the five Reddit credentials are set. Never carries the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialPresence {
    pub client_id: bool,
    pub client_secret: bool,
    pub username: bool,
    pub password: bool,
    pub user_agent: bool,
}

impl CredentialPresence {
    pub fn entries(&self) -> [(&'static str, bool); 5] {
        [
            ("client_id", self.client_id),
            ("client_secret", self.client_secret),
            ("username", self.username),
            ("password", self.password),
            ("user_agent", self.user_agent),
        ]
    }
}

/// Strips surrounding whitespace and an `r/` prefix.
pub fn normalize_subreddit(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix("r/").unwrap_or(name).trim().to_string()
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(contents)?;
        config.research.subreddit = normalize_subreddit(&config.research.subreddit);
        Ok(config)
    }

    /// Reads `path` if given. A missing explicit path is an error; when no
    /// path is given the defaults are used.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No configuration file given, using defaults");
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlays values from `lookup`. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_CLIENT_ID) {
            self.reddit.client_id = Some(value);
        }
        if let Some(value) = get(ENV_CLIENT_SECRET) {
            self.reddit.client_secret = Some(value);
        }
        if let Some(value) = get(ENV_USERNAME) {
            self.reddit.username = Some(value);
        }
        if let Some(value) = get(ENV_PASSWORD) {
            self.reddit.password = Some(value);
        }
        if let Some(value) = get(ENV_USER_AGENT) {
            self.reddit.user_agent = Some(value);
        }
        if let Some(value) = get(ENV_SUBREDDIT) {
            self.research.subreddit = normalize_subreddit(&value);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let subreddit = self.research.subreddit.as_str();
        if subreddit.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "research.subreddit".to_string(),
            });
        }
        if !subreddit
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                field: "research.subreddit".to_string(),
                value: subreddit.to_string(),
            });
        }
        if self.research.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "research.limit".to_string(),
                value: "0".to_string(),
            });
        }
        if self.enrichment.summary_sentences == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enrichment.summary_sentences".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn credential_presence(&self) -> CredentialPresence {
        let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        CredentialPresence {
            client_id: set(&self.reddit.client_id),
            client_secret: set(&self.reddit.client_secret),
            username: set(&self.reddit.username),
            password: set(&self.reddit.password),
            user_agent: set(&self.reddit.user_agent),
        }
    }
}
