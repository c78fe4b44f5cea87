//! Fixtures shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use prodhunt_core::{SelectorConfig, SourceConfig};

use crate::error::FetchError;
use crate::fetch::PageFetcher;

pub(crate) const BASE_URL: &str = "https://shop.test";

pub(crate) fn source(name: &str) -> SourceConfig {
    SourceConfig {
        name: name.to_owned(),
        base_url: BASE_URL.to_owned(),
        search_url: format!("{BASE_URL}/search?q={{keyword}}"),
        enabled: true,
        selectors: SelectorConfig {
            item: "div.result".to_owned(),
            name: "h2 a span".to_owned(),
            price: ".price".to_owned(),
            review_text: ".review".to_owned(),
            product_link: "h2 a".to_owned(),
            image: "img.thumb".to_owned(),
            next_page: Some("a.next".to_owned()),
        },
    }
}

/// One fully populated result item.
pub(crate) fn item(slug: &str, name: &str, price: &str, review: &str) -> String {
    format!(
        r#"<div class="result">
             <h2><a href="/p/{slug}"><span>{name}</span></a></h2>
             <span class="price">{price}</span>
             <span class="review">{review}</span>
             <img class="thumb" src="/img/{slug}.jpg">
           </div>"#
    )
}

pub(crate) fn page(items: &[String], next: Option<&str>) -> String {
    let next = next.map_or_else(String::new, |href| {
        format!(r#"<a class="next" href="{href}">Next</a>"#)
    });
    format!(
        "<html><body><div id=\"results\">{}</div>{next}</body></html>",
        items.join("\n")
    )
}

/// Serves canned bodies by URL and records every URL requested.
/// Unknown URLs answer with [`FetchError::NotFound`].
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    latency: Duration,
    requested: Mutex<Vec<String>>,
    timings: Mutex<Vec<(Instant, Instant)>>,
}

impl StaticFetcher {
    pub(crate) fn with_page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_owned(), body);
        self
    }

    /// Each fetch takes `latency` before answering.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("lock").clone()
    }

    /// `(started, finished)` for every fetch, in call order.
    pub(crate) fn timings(&self) -> Vec<(Instant, Instant)> {
        self.timings.lock().expect("lock").clone()
    }
}

impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().expect("lock").push(url.to_owned());
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.timings
            .lock()
            .expect("lock")
            .push((started, Instant::now()));
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_owned(),
            })
    }
}
