//! Price text to decimal conversion.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price regex"));

/// Parses the first numeric amount out of rendered price text.
///
/// Thousands separators are dropped and a dangling decimal point (Amazon's
/// `.a-price-whole` renders `"1,299."`) is ignored. Returns `None` when no
/// digits are present.
///
/// ```
/// # use prodhunt_core::parse_price;
/// # use rust_decimal::Decimal;
/// assert_eq!(parse_price("$1,299.99"), Some(Decimal::new(129_999, 2)));
/// assert_eq!(parse_price("1,299."), Some(Decimal::new(1299, 0)));
/// assert_eq!(parse_price("N/A"), None);
/// ```
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let token = PRICE_RE.find(raw)?.as_str().replace(',', "");
    Decimal::from_str(&token).ok()
}
