//! Frequency-based extractive summaries.
//!
//! Sentences are ranked by the summed relative frequency of their content
//! words; the best ones are returned in their original order.

use crate::truncate_chars;
use researcher_core::COMMENT_SEPARATOR;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
    "got", "had", "has", "have", "he", "her", "him", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "just", "like", "me", "more", "my", "no", "not", "of", "on", "one", "or", "our",
    "out", "so", "some", "than", "that", "the", "their", "them", "then", "there", "they", "this",
    "to", "up", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would",
    "you", "your",
];

#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    max_sentences: usize,
    max_input_chars: usize,
}

impl ExtractiveSummarizer {
    pub fn new(max_sentences: usize, max_input_chars: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
            max_input_chars,
        }
    }

    pub fn summarize(&self, text: &str) -> String {
        let text = truncate_chars(text, self.max_input_chars);
        let sentences = split_sentences(text);
        if sentences.len() <= self.max_sentences {
            return sentences.join(" ");
        }

        let frequencies = word_frequencies(&sentences);
        let Some(max_frequency) = frequencies.values().copied().max() else {
            // No content words at all; keep the opening sentences.
            return sentences[..self.max_sentences].join(" ");
        };

        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(index, sentence)| {
                let score = content_words(sentence)
                    .map(|word| frequencies[&word] as f64 / max_frequency as f64)
                    .sum();
                (index, score)
            })
            .collect();

        // Highest score first, earlier sentence wins ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut chosen: Vec<usize> = scored
            .into_iter()
            .take(self.max_sentences)
            .map(|(index, _)| index)
            .collect();
        chosen.sort_unstable();

        chosen
            .into_iter()
            .map(|index| sentences[index])
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Splits on the comment separator, line breaks and `.`/`!`/`?` followed by
/// whitespace. Fragments without any alphanumeric character are dropped.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    for segment in text.split(COMMENT_SEPARATOR) {
        let mut start = 0;
        let mut chars = segment.char_indices().peekable();
        while let Some((index, c)) = chars.next() {
            let at_boundary = match c {
                '\n' | '\r' => true,
                '.' | '!' | '?' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
                _ => false,
            };
            if at_boundary {
                let end = index + c.len_utf8();
                sentences.push(&segment[start..end]);
                start = end;
            }
        }
        sentences.push(&segment[start..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .collect()
}

fn content_words(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|word| word.trim_matches('\'').to_lowercase())
        .filter(|word| word.chars().count() > 1 && !STOP_WORDS.contains(&word.as_str()))
}

fn word_frequencies(sentences: &[&str]) -> HashMap<String, usize> {
    let mut frequencies = HashMap::new();
    for sentence in sentences {
        for word in content_words(sentence) {
            *frequencies.entry(word).or_insert(0) += 1;
        }
    }
    frequencies
}
