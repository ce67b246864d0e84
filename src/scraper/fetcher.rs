// src/scraper/fetcher.rs

use crate::config::SearchTarget;
use crate::domain::ListingSet;
use crate::scraper::{ExtractError, ListingExtractor, ScraperError};
use crate::sleeper::Sleeper;
use rand::Rng;
use reqwest::blocking::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(2);
const JITTER_MAX_MILLIS: u64 = 2000;

/// Something that returns the results page starting at `offset`.
pub trait PageSource {
    fn fetch_page(&self, offset: usize) -> Result<String, ScraperError>;
}

/// Build the request URL for the page starting at `offset`.
pub fn search_url(target: &SearchTarget, offset: usize) -> Result<Url, ScraperError> {
    let base = match target {
        SearchTarget::Filtered { base_url, .. } => base_url,
        SearchTarget::Direct(url) => url,
    };
    let mut url = Url::parse(base).map_err(|e| ScraperError::Network(format!("{base}: {e}")))?;

    {
        let mut q = url.query_pairs_mut();
        if let SearchTarget::Filtered {
            max_price,
            search_distance,
            postal,
            ..
        } = target
        {
            q.append_pair("max_price", &max_price.to_string())
                .append_pair("hasPic", "1")
                .append_pair("bundleDuplicates", "1")
                .append_pair("search_distance", &search_distance.to_string())
                .append_pair("postal", postal);
        }
        q.append_pair("s", &offset.to_string());
    }

    Ok(url)
}

/// Blocking client that presents itself as a desktop browser.
pub fn browser_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).timeout(timeout).build()
}

/// Blocking HTTP page source for the live site.
pub struct HttpPageSource {
    client: Client,
    target: SearchTarget,
}

impl HttpPageSource {
    pub fn new(target: SearchTarget, timeout: Duration) -> Result<Self, ScraperError> {
        let client = browser_client(timeout).map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client, target })
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, offset: usize) -> Result<String, ScraperError> {
        let url = search_url(&self.target, offset)?;
        info!("📄 Requesting {url}");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text().map_err(|e| ScraperError::Network(e.to_string()))
    }
}

/// Result of one sweep over the paginated results.
#[derive(Debug, Default)]
pub struct Sweep {
    pub listings: ListingSet,
    /// Pages that returned at least one fragment.
    pub pages: usize,
    /// Fragments that could not be turned into a listing.
    pub skipped: usize,
}

pub struct PaginatedFetcher<S> {
    source: S,
    extractor: ListingExtractor,
    sleeper: Box<dyn Sleeper>,
    max_pages: usize,
}

impl<S: PageSource> PaginatedFetcher<S> {
    pub fn new(
        source: S,
        extractor: ListingExtractor,
        sleeper: Box<dyn Sleeper>,
        max_pages: usize,
    ) -> Self {
        Self {
            source,
            extractor,
            sleeper,
            max_pages,
        }
    }

    /// Walk the result pages from offset zero until a page comes back empty.
    ///
    /// The offset advances by however many fragments the previous page held. A
    /// listing seen again on a later page replaces the earlier copy.
    pub fn sweep(&self) -> Result<Sweep, ScraperError> {
        let mut sweep = Sweep::default();
        let mut offset = 0;
        let mut requests = 0;

        loop {
            if requests >= self.max_pages {
                warn!(
                    "⚠️ Stopping sweep after {requests} page requests (offset {offset}); results may be incomplete"
                );
                break;
            }
            requests += 1;

            let html = self.fetch_with_retry(offset)?;
            let document = Html::parse_document(&html);
            let fragments = self.extractor.fragments(&document);

            if fragments.is_empty() {
                debug!("🏁 Empty page at offset {offset}, sweep complete");
                break;
            }

            info!("✅ Got {} results at offset {offset}", fragments.len());
            sweep.pages += 1;

            for fragment in &fragments {
                match self.extractor.extract(*fragment) {
                    Ok(listing) => {
                        sweep.listings.insert(listing.url.clone(), listing);
                    }
                    Err(ExtractError::NoPhotos) => {
                        sweep.skipped += 1;
                        debug!("Skipping listing without photos");
                    }
                    Err(e) => {
                        sweep.skipped += 1;
                        warn!("Skipping listing: {e}");
                    }
                }
            }

            offset += fragments.len();
        }

        Ok(sweep)
    }

    fn fetch_with_retry(&self, offset: usize) -> Result<String, ScraperError> {
        let mut attempt = 1;
        loop {
            match self.source.fetch_page(offset) {
                Ok(html) => return Ok(html),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!("⚠️ Page at offset {offset} failed (attempt {attempt}): {e}");
                    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MILLIS);
                    self.sleeper
                        .sleep(RETRY_BACKOFF * attempt + Duration::from_millis(jitter));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
