mod extractor;
mod fetcher;
mod scraper_error;

pub use extractor::ListingExtractor;
pub use fetcher::{browser_client, search_url, HttpPageSource, PageSource, PaginatedFetcher};
pub use scraper_error::{ExtractError, ScraperError};
