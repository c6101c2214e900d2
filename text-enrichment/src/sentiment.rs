use crate::truncate_chars;
use researcher_core::SentimentScore;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER compound polarity, labelled with the ±0.05 thresholds.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
    max_input_chars: usize,
}

impl VaderScorer {
    pub fn new(max_input_chars: usize) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            max_input_chars,
        }
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let text = truncate_chars(text, self.max_input_chars);
        if text.trim().is_empty() {
            return SentimentScore::neutral();
        }

        let scores = self.analyzer.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or(0.0);
        SentimentScore::from_compound(compound)
    }
}
