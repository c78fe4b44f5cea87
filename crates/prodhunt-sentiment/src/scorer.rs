//! Lexicon scorer for product review sentiment.

use prodhunt_core::{SentimentScorer, NEUTRAL_SCORE};

/// Review-vocabulary word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("perfect", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("recommend", 0.4),
    ("recommended", 0.4),
    ("quality", 0.3),
    ("reliable", 0.4),
    ("durable", 0.4),
    ("sturdy", 0.3),
    ("fast", 0.2),
    ("easy", 0.2),
    ("comfortable", 0.3),
    ("happy", 0.4),
    ("satisfied", 0.4),
    ("works", 0.2),
    ("value", 0.2),
    ("worth", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("poor", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("broken", -0.5),
    ("broke", -0.5),
    ("defective", -0.6),
    ("cheap", -0.2),
    ("flimsy", -0.4),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("useless", -0.6),
    ("waste", -0.5),
    ("return", -0.3),
    ("returned", -0.4),
    ("refund", -0.4),
    ("scam", -0.7),
    ("fake", -0.6),
    ("slow", -0.2),
    ("problem", -0.3),
    ("failed", -0.4),
    ("stopped", -0.3),
];

/// Words that flip the sign of the lexicon word directly after them.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "hardly", "isn't", "wasn't", "don't", "doesn't", "didn't", "won't",
];

fn weight_of(word: &str) -> Option<f32> {
    LEXICON
        .iter()
        .find(|&&(lex_word, _)| lex_word == word)
        .map(|&(_, weight)| weight)
}

/// Score a text string using the review lexicon.
///
/// Splits text into lowercase words, sums matching weights (negated when the
/// previous word is a negator), and clamps the result to `[-1.0, 1.0]`.
/// Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    let mut negate_next = false;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic() && c != '\'')
            .trim_matches('\'')
            .to_lowercase();
        if NEGATORS.contains(&w.as_str()) {
            negate_next = true;
            continue;
        }
        if let Some(weight) = weight_of(&w) {
            score += if negate_next { -weight } else { weight };
        }
        negate_next = false;
    }
    score.clamp(-1.0, 1.0)
}

/// Score optional review text. Absent, blank, or unscorable text is neutral.
#[must_use]
pub fn score_review(text: Option<&str>) -> f32 {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return NEUTRAL_SCORE;
    };
    let score = lexicon_score(text);
    if score.is_finite() {
        score
    } else {
        tracing::warn!("lexicon produced a non-finite score; using neutral");
        NEUTRAL_SCORE
    }
}

/// [`SentimentScorer`] backed by [`score_review`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: Option<&str>) -> f32 {
        score_review(text)
    }
}
