use super::*;
use crate::test_support::{item, page, source, BASE_URL};

fn extractor() -> SelectorExtractor {
    SelectorExtractor::from_source(&source("Shop")).expect("selectors compile")
}

#[test]
fn extracts_items_in_document_order() {
    let html = page(
        &[
            item("a1", "Alpha Phone", "199.", "Great battery"),
            item("b2", "Beta Phone", "249.", "Bad screen"),
        ],
        None,
    );

    let extraction = extractor().extract(&html);

    assert_eq!(extraction.records.len(), 2);
    let first = &extraction.records[0];
    assert_eq!(first.name.as_deref(), Some("Alpha Phone"));
    assert_eq!(first.price.as_deref(), Some("199."));
    assert_eq!(first.review_text.as_deref(), Some("Great battery"));
    assert_eq!(
        first.product_url.as_deref(),
        Some(format!("{BASE_URL}/p/a1").as_str())
    );
    assert_eq!(
        first.image_url.as_deref(),
        Some(format!("{BASE_URL}/img/a1.jpg").as_str())
    );
    assert_eq!(extraction.records[1].name.as_deref(), Some("Beta Phone"));
    assert!(extraction.next_page.is_none());
}

#[test]
fn missing_fields_are_none_not_errors() {
    let html = r#"<div class="result"><h2><a href="/p/x"><span>Only Name</span></a></h2></div>"#;

    let extraction = extractor().extract(html);

    assert_eq!(extraction.records.len(), 1);
    let record = &extraction.records[0];
    assert_eq!(record.name.as_deref(), Some("Only Name"));
    assert!(record.price.is_none());
    assert!(record.review_text.is_none());
    assert!(record.image_url.is_none());
}

#[test]
fn whitespace_is_collapsed_and_blank_text_is_missing() {
    let html = r#"<div class="result">
        <h2><a href="/p/x"><span>  Big
            TV  </span></a></h2>
        <span class="price">   </span>
    </div>"#;

    let record = &extractor().extract(html).records[0];

    assert_eq!(record.name.as_deref(), Some("Big TV"));
    assert!(record.price.is_none());
}

#[test]
fn image_falls_back_to_data_src() {
    let html = r#"<div class="result">
        <img class="thumb" src="" data-src="https://cdn.test/lazy.jpg">
    </div>"#;

    let record = &extractor().extract(html).records[0];

    assert_eq!(record.image_url.as_deref(), Some("https://cdn.test/lazy.jpg"));
}

#[test]
fn absolute_links_are_kept_and_non_http_links_dropped() {
    let html = r#"
        <div class="result"><h2><a href="https://other.test/p/1"><span>A</span></a></h2></div>
        <div class="result"><h2><a href="javascript:void(0)"><span>B</span></a></h2></div>
    "#;

    let records = extractor().extract(html).records;

    assert_eq!(records[0].product_url.as_deref(), Some("https://other.test/p/1"));
    assert!(records[1].product_url.is_none());
}

#[test]
fn next_page_link_is_resolved_against_base_url() {
    let html = page(&[item("a1", "Alpha", "1.", "ok")], Some("/search?q=tv&page=2"));

    let extraction = extractor().extract(&html);

    assert_eq!(
        extraction.next_page.as_deref(),
        Some(format!("{BASE_URL}/search?q=tv&page=2").as_str())
    );
}

#[test]
fn no_next_selector_means_no_next_page() {
    let mut config = source("Shop");
    config.selectors.next_page = None;
    let extractor = SelectorExtractor::from_source(&config).expect("selectors compile");

    let html = page(&[item("a1", "Alpha", "1.", "ok")], Some("/page2"));

    assert!(extractor.extract(&html).next_page.is_none());
}

#[test]
fn page_without_items_yields_empty_extraction() {
    let extraction = extractor().extract("<html><body><p>No results</p></body></html>");
    assert!(extraction.records.is_empty());
}

#[test]
fn garbage_input_does_not_panic() {
    let extraction = extractor().extract("<<<div class=result>><h2><a href=>>");
    assert!(extraction.records.iter().all(|r| r.product_url.is_none()));
}

#[test]
fn invalid_selector_is_reported_with_field_name() {
    let mut config = source("Shop");
    config.selectors.price = "div[[".to_owned();

    let err = SelectorExtractor::from_source(&config).unwrap_err();

    match err {
        ScraperError::InvalidSelector {
            source_name, field, ..
        } => {
            assert_eq!(source_name, "Shop");
            assert_eq!(field, "price");
        }
        other => panic!("expected InvalidSelector, got {other:?}"),
    }
}

#[test]
fn relative_base_url_is_rejected() {
    let mut config = source("Shop");
    config.base_url = "shop.test".to_owned();

    let err = SelectorExtractor::from_source(&config).unwrap_err();

    assert!(matches!(err, ScraperError::InvalidBaseUrl { .. }));
}
