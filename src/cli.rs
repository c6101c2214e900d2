use clap::Parser;
use researcher_core::{normalize_subreddit, AppConfig};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "researcher.toml";

/// Fetch hot posts and their comments from a subreddit and write reports.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Subreddit to research, without the `r/` prefix
    #[arg(long)]
    pub subreddit: Option<String>,

    /// Number of hot posts to fetch
    #[arg(long)]
    pub limit: Option<u32>,

    /// Directory the reports are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Pause after each post, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Skip the comment summary
    #[arg(long)]
    pub no_summary: bool,

    /// Skip sentiment scoring
    #[arg(long)]
    pub no_sentiment: bool,
}

impl Opts {
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.is_file().then(|| default.to_path_buf())
        })
    }

    /// Flags win over every other configuration source.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(subreddit) = &self.subreddit {
            config.research.subreddit = normalize_subreddit(subreddit);
        }
        if let Some(limit) = self.limit {
            config.research.limit = limit;
        }
        if let Some(output_dir) = &self.output_dir {
            config.research.output_dir = output_dir.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.research.post_delay_ms = delay_ms;
        }
        if self.no_summary {
            config.research.summarize = false;
        }
        if self.no_sentiment {
            config.research.sentiment = false;
        }
    }
}
