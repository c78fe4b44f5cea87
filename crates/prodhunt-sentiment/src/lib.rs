//! Review sentiment scoring for prodhunt.
//!
//! Scores are produced by a deterministic word lexicon so the same review
//! text always maps to the same polarity in `[-1.0, 1.0]`.

pub mod scorer;

pub use scorer::{lexicon_score, score_review, LexiconScorer};
