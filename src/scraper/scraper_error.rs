use thiserror::Error;

/// Failures retrieving or parsing a whole results page.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
}

/// Failures normalizing a single listing fragment. Never fatal to a sweep.
#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("unparseable price {0:?}")]
    BadPrice(String),
    #[error("listing has no photos")]
    NoPhotos,
}
