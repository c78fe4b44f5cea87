//! CSS-selector extraction of search-result items from one HTML page.

use prodhunt_core::{RawRecord, SourceConfig};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Everything pulled from a single page: the result items in document order
/// and the absolute URL of the next results page, if the page links one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub records: Vec<RawRecord>,
    pub next_page: Option<String>,
}

/// Turns a page body into raw records. Extraction never fails: malformed
/// markup is parsed leniently and unmatched fields come back as `None`.
pub trait Extract: Send + Sync {
    fn extract(&self, html: &str) -> PageExtraction;
}

/// [`Extract`] implementation driven by a source's selector configuration.
///
/// Selectors are compiled once in [`SelectorExtractor::from_source`]. Text
/// fields are whitespace-collapsed and empty text counts as missing. The
/// product link is read from `href`; the image from `src`, falling back to
/// `data-src` for lazy-loaded thumbnails. Relative URLs are resolved against
/// the source's `base_url`, and only `http`/`https` results are kept.
#[derive(Debug)]
pub struct SelectorExtractor {
    base: Url,
    item: Selector,
    name: Selector,
    price: Selector,
    review_text: Selector,
    product_link: Selector,
    image: Selector,
    next_page: Option<Selector>,
}

impl SelectorExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that fails to parse, or [`ScraperError::InvalidBaseUrl`] if the
    /// source's `base_url` is not an absolute URL.
    pub fn from_source(source: &SourceConfig) -> Result<Self, ScraperError> {
        let base = Url::parse(&source.base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            source_name: source.name.clone(),
            url: source.base_url.clone(),
            reason: e.to_string(),
        })?;

        let compile = |field: &'static str, css: &str| {
            Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
                source_name: source.name.clone(),
                field,
                selector: css.to_owned(),
                reason: e.to_string(),
            })
        };

        let selectors = &source.selectors;
        Ok(Self {
            base,
            item: compile("item", &selectors.item)?,
            name: compile("name", &selectors.name)?,
            price: compile("price", &selectors.price)?,
            review_text: compile("review_text", &selectors.review_text)?,
            product_link: compile("product_link", &selectors.product_link)?,
            image: compile("image", &selectors.image)?,
            next_page: selectors
                .next_page
                .as_deref()
                .map(|css| compile("next_page", css))
                .transpose()?,
        })
    }

    fn extract_item(&self, item: ElementRef<'_>) -> RawRecord {
        RawRecord {
            name: first_text(item, &self.name),
            price: first_text(item, &self.price),
            review_text: first_text(item, &self.review_text),
            product_url: first_attr(item, &self.product_link, &["href"])
                .and_then(|href| self.resolve(&href)),
            image_url: first_attr(item, &self.image, &["src", "data-src"])
                .and_then(|src| self.resolve(&src)),
        }
    }

    fn resolve(&self, raw: &str) -> Option<String> {
        let url = self.base.join(raw.trim()).ok()?;
        matches!(url.scheme(), "http" | "https").then(|| url.to_string())
    }
}

impl Extract for SelectorExtractor {
    fn extract(&self, html: &str) -> PageExtraction {
        let document = Html::parse_document(html);

        let records = document
            .select(&self.item)
            .map(|item| self.extract_item(item))
            .collect();

        let next_page = self.next_page.as_ref().and_then(|selector| {
            document
                .select(selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .filter(|href| !href.trim().is_empty())
                .and_then(|href| self.resolve(href))
        });

        PageExtraction { records, next_page }
    }
}

/// Whitespace-collapsed text of the first descendant matching `selector`.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = scope.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// First non-blank value among `attrs` on the first descendant matching `selector`.
fn first_attr(scope: ElementRef<'_>, selector: &Selector, attrs: &[&str]) -> Option<String> {
    let element = scope.select(selector).next()?;
    attrs
        .iter()
        .filter_map(|attr| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
