pub mod sentiment;
pub mod summarizer;

use researcher_core::{EnrichmentConfig, SentimentScore};
use sentiment::VaderScorer;
use summarizer::ExtractiveSummarizer;

/// Derives a digest and a sentiment score from free text.
///
/// Neither operation fails: empty input yields `""` and a neutral score.
pub trait TextEnricher {
    fn summarize(&self, text: &str) -> String;
    fn score_sentiment(&self, text: &str) -> SentimentScore;
}

/// Built once at startup and passed to the fetch loop.
pub struct EnrichmentService {
    summarizer: ExtractiveSummarizer,
    scorer: VaderScorer,
}

impl EnrichmentService {
    pub fn new(config: &EnrichmentConfig) -> Self {
        tracing::debug!(
            "Initializing enrichment service ({} sentence summaries, {} char input cap)",
            config.summary_sentences,
            config.max_input_chars
        );
        Self {
            summarizer: ExtractiveSummarizer::new(config.summary_sentences, config.max_input_chars),
            scorer: VaderScorer::new(config.max_input_chars),
        }
    }
}

impl Default for EnrichmentService {
    fn default() -> Self {
        Self::new(&EnrichmentConfig::default())
    }
}

impl TextEnricher for EnrichmentService {
    fn summarize(&self, text: &str) -> String {
        self.summarizer.summarize(text)
    }

    fn score_sentiment(&self, text: &str) -> SentimentScore {
        self.scorer.score(text)
    }
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
