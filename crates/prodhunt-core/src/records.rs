use serde::{Deserialize, Serialize};

/// Fields pulled from a single search-result item. Every field is optional:
/// a selector that matches nothing yields `None` rather than failing the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: Option<String>,
    /// Price exactly as rendered on the page, e.g. `"1,299."` or `"$24.99"`.
    pub price: Option<String>,
    pub review_text: Option<String>,
    /// Absolute product page URL.
    pub product_url: Option<String>,
    /// Absolute image URL.
    pub image_url: Option<String>,
}

/// A product scraped from one source for one keyword.
///
/// Constructed per crawl, scored once, then handed to a
/// [`ProductSink`](crate::ProductSink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub price: Option<String>,
    pub review_text: Option<String>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
    /// Source name, e.g. `"Amazon"`.
    pub source: String,
    /// Review polarity in `[-1.0, 1.0]`; `0.0` until scored.
    pub sentiment_score: f32,
    pub keyword: String,
}

impl ProductRecord {
    #[must_use]
    pub fn from_raw(raw: RawRecord, source: &str, keyword: &str) -> Self {
        Self {
            name: raw.name,
            price: raw.price,
            review_text: raw.review_text,
            product_url: raw.product_url,
            image_url: raw.image_url,
            source: source.to_string(),
            sentiment_score: crate::NEUTRAL_SCORE,
            keyword: keyword.to_string(),
        }
    }

    /// `true` when every field except `sentiment_score` and `keyword` is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.price.is_some()
            && self.review_text.is_some()
            && self.product_url.is_some()
            && self.image_url.is_some()
            && !self.source.is_empty()
    }

    /// Attaches a sentiment score, clamped to `[-1.0, 1.0]`. Non-finite
    /// scores are stored as neutral.
    #[must_use]
    pub fn with_sentiment(mut self, score: f32) -> Self {
        self.sentiment_score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            crate::NEUTRAL_SCORE
        };
        self
    }
}

impl crate::Rankable for ProductRecord {
    fn price_text(&self) -> Option<&str> {
        self.price.as_deref()
    }

    fn sentiment_score(&self) -> f64 {
        f64::from(self.sentiment_score)
    }
}
