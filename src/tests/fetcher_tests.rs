// src/tests/fetcher_tests.rs

use super::utils::{
    absolute, fetcher, fetcher_with_sleeper, page, row, EndlessSource, RecordingSleeper,
    ScriptedSource,
};
use std::time::Duration;
use crate::scraper::ScraperError;

#[test]
fn sweep_stops_at_first_empty_page_and_advances_by_fragment_count() {
    let first = page(&[
        row("/a", "$1,000", None, 2),
        row("/b", "$1,100", None, 2),
        row("/c", "$1,200", None, 2),
    ]);
    // "/c" shows up again on the second page; the later copy wins.
    let second = page(&[row("/c", "$999", None, 2), row("/d", "$1,300", None, 2)]);

    let source = ScriptedSource::new(vec![Some(first), Some(second)]);
    let offsets = source.offsets.clone();

    let sweep = fetcher(source, true, 25).sweep().unwrap();

    assert_eq!(*offsets.borrow(), vec![0, 3, 5]);
    assert_eq!(sweep.pages, 2);
    assert_eq!(sweep.listings.len(), 4);
    assert_eq!(sweep.listings[&absolute("/c")].price, 999.0);
}

#[test]
fn first_page_listing_without_housing_gets_unset_fields() {
    let source = ScriptedSource::new(vec![Some(page(&[row("/apt1", "$1,950", None, 0)]))]);

    let sweep = fetcher(source, false, 25).sweep().unwrap();

    let listing = &sweep.listings[&absolute("/apt1")];
    assert_eq!(listing.price, 1950.0);
    assert_eq!(listing.bedrooms, None);
    assert_eq!(listing.size_sqft, None);
}

#[test]
fn bad_fragments_are_skipped_without_failing_the_sweep() {
    let rows = vec![
        row("/good", "$1,500", Some("2br - 700ft2"), 3),
        row("/no-photos", "$1,500", None, 0),
        row("/bad-price", "call me", None, 2),
        r#"<li class="result-row"><span class="result-price">$5</span></li>"#.to_string(),
    ];
    let source = ScriptedSource::new(vec![Some(page(&rows))]);
    let offsets = source.offsets.clone();

    let sweep = fetcher(source, true, 25).sweep().unwrap();

    assert_eq!(sweep.listings.len(), 1);
    assert_eq!(sweep.skipped, 3);
    let good = &sweep.listings[&absolute("/good")];
    assert_eq!(good.bedrooms.as_deref(), Some("2"));
    assert_eq!(good.size_sqft.as_deref(), Some("700"));
    // offset still advances by every fragment on the page, parsed or not
    assert_eq!(*offsets.borrow(), vec![0, 4]);
}

#[test]
fn transient_page_failure_is_retried() {
    let source = ScriptedSource::new(vec![None, Some(page(&[row("/a", "$1", None, 2)]))]);
    let offsets = source.offsets.clone();
    let sleeper = RecordingSleeper::default();

    let sweep = fetcher_with_sleeper(source, &sleeper, true, 25).sweep().unwrap();

    assert_eq!(sweep.listings.len(), 1);
    assert_eq!(*offsets.borrow(), vec![0, 0, 1]);
    // one backoff: 2s base plus up to 2s of jitter
    let waits = sleeper.waits.borrow();
    assert_eq!(waits.len(), 1);
    assert!(waits[0] >= Duration::from_secs(2) && waits[0] <= Duration::from_secs(4));
}

#[test]
fn persistent_page_failure_fails_the_sweep() {
    let source = ScriptedSource::new(vec![None, None, None]);
    let offsets = source.offsets.clone();
    let sleeper = RecordingSleeper::default();

    let result = fetcher_with_sleeper(source, &sleeper, true, 25).sweep();

    assert!(matches!(result, Err(ScraperError::Network(_))));
    assert_eq!(offsets.borrow().len(), 3);
    assert_eq!(sleeper.waits.borrow().len(), 2);
}

#[test]
fn never_ending_results_stop_at_the_page_cap() {
    let sweep = fetcher(EndlessSource, true, 4).sweep().unwrap();

    assert_eq!(sweep.pages, 4);
    assert_eq!(sweep.listings.len(), 4);
}
