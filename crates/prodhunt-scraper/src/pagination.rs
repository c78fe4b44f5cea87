//! Loop detection for "next page" pagination.
//!
//! Search result pages link forward with an anchor whose `href` the extractor
//! resolves to an absolute URL. Two failure modes end a crawl early:
//!
//! - the next link points at a page already fetched in this crawl, or
//! - a page at a new URL repeats the exact item list of an earlier page
//!   (marketplaces often clamp out-of-range `page=` values to the last page).

use std::collections::HashSet;

use prodhunt_core::RawRecord;
use sha2::{Digest, Sha256};

/// Tracks URLs and item-list fingerprints already seen during one crawl.
#[derive(Debug, Default)]
pub(crate) struct PageTracker {
    visited: HashSet<String>,
    fingerprints: HashSet<[u8; 32]>,
}

impl PageTracker {
    /// Marks `url` as fetched.
    pub(crate) fn visit(&mut self, url: &str) {
        self.visited.insert(normalize_page_url(url));
    }

    #[must_use]
    pub(crate) fn was_visited(&self, url: &str) -> bool {
        self.visited.contains(&normalize_page_url(url))
    }

    /// Records the item list of a page. Returns `false` when an identical
    /// list was already recorded.
    pub(crate) fn record_page(&mut self, records: &[RawRecord]) -> bool {
        self.fingerprints.insert(page_fingerprint(records))
    }
}

/// Drops the fragment, which never changes the server response.
fn normalize_page_url(url: &str) -> String {
    url.split_once('#').map_or(url, |(head, _)| head).to_owned()
}

/// SHA-256 over every field of every record, in order, with separators so
/// that field boundaries cannot shift.
fn page_fingerprint(records: &[RawRecord]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for record in records {
        for field in [
            &record.name,
            &record.price,
            &record.review_text,
            &record.product_url,
            &record.image_url,
        ] {
            match field {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.as_bytes());
                    hasher.update([0u8]);
                }
                None => hasher.update([2u8]),
            }
        }
        hasher.update([0xffu8]);
    }
    hasher.finalize().into()
}
