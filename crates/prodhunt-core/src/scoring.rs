/// Score used when review text is absent or cannot be scored.
pub const NEUTRAL_SCORE: f32 = 0.0;

/// Maps review text to a polarity in `[-1.0, 1.0]`.
///
/// Implementations must be deterministic: the same text always yields the
/// same score. Absent or blank text must yield [`NEUTRAL_SCORE`].
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: Option<&str>) -> f32;
}
