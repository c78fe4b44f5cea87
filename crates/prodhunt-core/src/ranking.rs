//! Best-product selection.
//!
//! The composite score is `sentiment_weight * sentiment - price_weight * price`.
//! With the default weights of `1.0` this is `sentiment - price`, which lets
//! price dominate for anything but near-free items. The formula is a business
//! rule; adjust the weights through configuration rather than editing here.

use rust_decimal::prelude::ToPrimitive;

use crate::parse_price;

/// Multipliers applied to each term of the composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub sentiment: f64,
    pub price: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            sentiment: 1.0,
            price: 1.0,
        }
    }
}

impl RankingWeights {
    #[must_use]
    pub fn composite(&self, sentiment: f64, price: f64) -> f64 {
        self.sentiment * sentiment - self.price * price
    }
}

/// Anything the ranker can score: a price to parse and a sentiment score.
pub trait Rankable {
    fn price_text(&self) -> Option<&str>;
    fn sentiment_score(&self) -> f64;
}

/// Composite score for one item, or `None` when its price does not parse or
/// the result is not a finite number.
#[must_use]
pub fn composite_score<T: Rankable + ?Sized>(item: &T, weights: RankingWeights) -> Option<f64> {
    let price = item.price_text().and_then(parse_price)?.to_f64()?;
    let score = weights.composite(item.sentiment_score(), price);
    score.is_finite().then_some(score)
}

/// Returns the item with the highest composite score.
///
/// Items without a parseable price are skipped. Ties go to the item seen
/// first. Returns `None` when nothing is rankable.
pub fn best<'a, T, I>(items: I, weights: RankingWeights) -> Option<&'a T>
where
    T: Rankable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut winner: Option<(&'a T, f64)> = None;
    for item in items {
        let Some(score) = composite_score(item, weights) else {
            continue;
        };
        match winner {
            Some((_, best_score)) if score <= best_score => {}
            _ => winner = Some((item, score)),
        }
    }
    winner.map(|(item, _)| item)
}
