use serde::{Deserialize, Serialize};
use std::fmt;

/// Joins comment bodies into `PostRecord::all_comments`.
pub const COMMENT_SEPARATOR: &str = " | ";

/// Compound scores at or beyond this magnitude are polar.
pub const SENTIMENT_THRESHOLD: f64 = 0.05;

/// One row of research output per fetched post.
///
/// Field order is the column order of the CSV and spreadsheet outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: String,
    pub title: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub num_comments: u64,
    pub created_utc: f64,
    pub all_comments: String,
    pub summary: Option<String>,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
}

impl PostRecord {
    pub const COLUMNS: [&'static str; 11] = [
        "post_id",
        "title",
        "score",
        "upvote_ratio",
        "url",
        "num_comments",
        "created_utc",
        "all_comments",
        "summary",
        "sentiment",
        "sentiment_score",
    ];

    /// An empty digest is stored as `None`, which is also what a blank CSV
    /// cell reads back as.
    pub fn apply_summary(&mut self, digest: String) {
        self.summary = Some(digest).filter(|d| !d.is_empty());
    }

    pub fn apply_sentiment(&mut self, sentiment: SentimentScore) {
        self.sentiment = Some(sentiment.label);
        self.sentiment_score = Some(sentiment.compound);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Positive at `>= 0.05`, Negative at `<= -0.05`, Neutral in between.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= SENTIMENT_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -SENTIMENT_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    pub compound: f64,
}

impl SentimentScore {
    pub fn from_compound(compound: f64) -> Self {
        Self {
            label: SentimentLabel::from_compound(compound),
            compound,
        }
    }

    pub fn neutral() -> Self {
        Self::from_compound(0.0)
    }
}
