// src/tests/utils.rs

use crate::domain::Listing;
use crate::notify::{BotTransport, DispatchLimits, LinkProbe, NotificationDispatcher, TransportError};
use crate::scraper::{ListingExtractor, PageSource, PaginatedFetcher, ScraperError};
use crate::sleeper::Sleeper;
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;
use url::Url;

pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(600);

pub const BASE: &str = "https://sfbay.craigslist.org/search/apa";

/// One `li.result-row`. `photos` is the number of image ids in the gallery anchor.
pub fn row(path: &str, price: &str, housing: Option<&str>, photos: usize) -> String {
    let gallery = if photos == 0 {
        String::new()
    } else {
        let ids: Vec<String> = (0..photos).map(|i| format!("3:00x0x_{i}")).collect();
        format!(r#"<a href="{path}" class="result-image gallery" data-ids="{}"></a>"#, ids.join(","))
    };
    let housing = housing
        .map(|h| format!(r#"<span class="housing">{h}</span>"#))
        .unwrap_or_default();

    format!(
        r#"<li class="result-row">{gallery}
            <time class="result-date" datetime="2024-03-01 10:15">Mar 1</time>
            <a href="{path}" class="result-title hdrlnk">Listing {path}</a>
            <span class="result-meta">
              <span class="result-price">{price}</span>{housing}
              <span class="result-hood"> (outer sunset)</span>
            </span>
        </li>"#
    )
}

pub fn page(rows: &[String]) -> String {
    format!(
        "<html><body><ul class=\"rows\">{}</ul></body></html>",
        rows.concat()
    )
}

pub fn empty_page() -> String {
    page(&[])
}

pub fn absolute(path: &str) -> String {
    Url::parse(BASE).unwrap().join(path).unwrap().to_string()
}

pub fn listing(path: &str, photos: usize) -> Listing {
    Listing {
        url: absolute(path),
        posted_at: "2024-03-01 10:15".to_string(),
        price: 2000.0,
        neighborhood: "outer sunset".to_string(),
        photo_urls: (0..photos).map(|i| format!("https://img/{i}.jpg")).collect(),
        bedrooms: Some("1".to_string()),
        size_sqft: None,
    }
}

/// Serves pages by request number. `None` entries fail; past the end, pages are empty.
pub struct ScriptedSource {
    pages: Vec<Option<String>>,
    pub offsets: Rc<RefCell<Vec<usize>>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Option<String>>) -> Self {
        Self {
            pages,
            offsets: Rc::default(),
        }
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(&self, offset: usize) -> Result<String, ScraperError> {
        let index = self.offsets.borrow().len();
        self.offsets.borrow_mut().push(offset);
        match self.pages.get(index) {
            Some(Some(html)) => Ok(html.clone()),
            Some(None) => Err(ScraperError::Network("connection reset".to_string())),
            None => Ok(empty_page()),
        }
    }
}

/// Never runs dry: every request yields a fresh listing.
pub struct EndlessSource;

impl PageSource for EndlessSource {
    fn fetch_page(&self, offset: usize) -> Result<String, ScraperError> {
        Ok(page(&[row(&format!("/endless{offset}"), "$100", None, 2)]))
    }
}

pub fn fetcher<S: PageSource>(source: S, require_photos: bool, max_pages: usize) -> PaginatedFetcher<S> {
    fetcher_with_sleeper(source, &RecordingSleeper::default(), require_photos, max_pages)
}

pub fn fetcher_with_sleeper<S: PageSource>(
    source: S,
    sleeper: &RecordingSleeper,
    require_photos: bool,
    max_pages: usize,
) -> PaginatedFetcher<S> {
    let extractor = ListingExtractor::new(Url::parse(BASE).unwrap(), require_photos).unwrap();
    PaginatedFetcher::new(source, extractor, Box::new(sleeper.clone()), max_pages)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Photos(Vec<String>),
}

/// Records every outbound call. Sends pop scripted results; once a script is
/// exhausted they succeed.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub sent: Rc<RefCell<Vec<Sent>>>,
    pub text_results: Rc<RefCell<VecDeque<Result<(), TransportError>>>>,
    pub photo_results: Rc<RefCell<VecDeque<Result<(), TransportError>>>>,
}

impl RecordingTransport {
    pub fn scripted(results: Vec<Result<(), TransportError>>) -> Self {
        let t = Self::default();
        t.text_results.borrow_mut().extend(results);
        t
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Sent::Text(t) => Some(t.clone()),
                Sent::Photos(_) => None,
            })
            .collect()
    }

    pub fn photo_batches(&self) -> Vec<Vec<String>> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Sent::Photos(p) => Some(p.clone()),
                Sent::Text(_) => None,
            })
            .collect()
    }
}

impl BotTransport for RecordingTransport {
    fn send_message(&self, text: &str) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(Sent::Text(text.to_string()));
        self.text_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    fn send_media_group(&self, photo_urls: &[String]) -> Result<(), TransportError> {
        self.sent.borrow_mut().push(Sent::Photos(photo_urls.to_vec()));
        self.photo_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

/// Every URL is live except the dead ones; unreachable ones fail the request.
#[derive(Default)]
pub struct FixedProbe {
    pub dead: HashSet<String>,
    pub unreachable: HashSet<String>,
}

impl LinkProbe for FixedProbe {
    fn is_live(&self, url: &str) -> Result<bool, TransportError> {
        if self.unreachable.contains(url) {
            return Err(TransportError::Request("connection refused".to_string()));
        }
        Ok(!self.dead.contains(url))
    }
}

#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pub waits: Rc<RefCell<Vec<Duration>>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}

pub fn dispatcher(
    transport: &RecordingTransport,
    probe: FixedProbe,
    sleeper: &RecordingSleeper,
    max_number: usize,
    max_photo_number: usize,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Box::new(transport.clone()),
        Box::new(probe),
        Box::new(sleeper.clone()),
        DispatchLimits {
            max_number,
            max_photo_number,
            max_retry_wait: MAX_RETRY_WAIT,
        },
    )
}
