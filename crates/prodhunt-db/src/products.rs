//! Database operations for `products`.

use chrono::{DateTime, Utc};
use prodhunt_core::{best, parse_price, ProductRecord, Rankable, RankingWeights};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

/// A row from `products`, joined with the owning source's name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub source_id: i64,
    pub source_name: String,
    pub keyword: String,
    pub name: String,
    /// Price text as scraped.
    pub price: String,
    /// Parsed from `price`; `None` when the text held no number.
    pub price_amount: Option<Decimal>,
    pub review_text: String,
    pub product_url: String,
    pub image_url: String,
    pub sentiment_score: f32,
    pub created_at: DateTime<Utc>,
}

impl Rankable for ProductRow {
    fn price_text(&self) -> Option<&str> {
        Some(&self.price)
    }

    fn sentiment_score(&self) -> f64 {
        f64::from(self.sentiment_score)
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.source_id, s.name AS source_name, p.keyword, p.name, \
     p.price, p.price_amount, p.review_text, p.product_url, p.image_url, \
     p.sentiment_score, p.created_at";

/// Inserts one scored record under `source_id` and returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::IncompleteRecord`] if any scraped field is missing, or
/// [`DbError::Sqlx`] if the insert fails (for example an unknown `source_id`).
pub async fn insert_product(
    pool: &PgPool,
    record: &ProductRecord,
    source_id: i64,
) -> Result<i64, DbError> {
    let name = required(record.name.as_deref(), "name")?;
    let price = required(record.price.as_deref(), "price")?;
    let review_text = required(record.review_text.as_deref(), "review_text")?;
    let product_url = required(record.product_url.as_deref(), "product_url")?;
    let image_url = required(record.image_url.as_deref(), "image_url")?;
    let price_amount = parse_price(price).map(|amount| amount.round_dp(2));

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (source_id, keyword, name, price, price_amount, review_text, \
              product_url, image_url, sentiment_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(source_id)
    .bind(&record.keyword)
    .bind(name)
    .bind(price)
    .bind(price_amount)
    .bind(review_text)
    .bind(product_url)
    .bind(image_url)
    .bind(record.sentiment_score)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Matches for a name search plus the best pick among all of them.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSearch {
    /// Newest first, truncated to the requested limit.
    pub products: Vec<ProductRow>,
    /// Ranked over every match, not only the returned page; `None` when no
    /// match has a parseable price.
    pub best_product: Option<ProductRow>,
}

/// Case-insensitive substring search on product name, newest first.
///
/// `%` and `_` in `query` match literally. The best pick is chosen before
/// `products` is cut down to `limit`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_products(
    pool: &PgPool,
    query: &str,
    limit: i64,
    weights: RankingWeights,
) -> Result<ProductSearch, DbError> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products p \
         JOIN sources s ON s.id = p.source_id \
         WHERE p.name ILIKE $1 ESCAPE '\\' \
         ORDER BY p.created_at DESC, p.id DESC"
    );

    let mut products = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

    let best_product = best(&products, weights).cloned();
    products.truncate(usize::try_from(limit).unwrap_or(0));

    Ok(ProductSearch {
        products,
        best_product,
    })
}

/// Most recently stored products.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} \
         FROM products p \
         JOIN sources s ON s.id = p.source_id \
         ORDER BY p.created_at DESC, p.id DESC \
         LIMIT $1"
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, DbError> {
    value.ok_or(DbError::IncompleteRecord { field })
}

/// Escapes `LIKE` metacharacters so they match literally with `ESCAPE '\'`.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards_and_backslash() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("usb hub"), "usb hub");
    }

    #[test]
    fn required_names_missing_field() {
        let err = required(None, "image_url").unwrap_err();
        assert!(matches!(err, DbError::IncompleteRecord { field: "image_url" }));
    }
}
