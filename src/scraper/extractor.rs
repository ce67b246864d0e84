// src/scraper/extractor.rs

use crate::domain::{parse_housing, Listing};
use crate::scraper::{ExtractError, ScraperError};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const IMAGE_HOST: &str = "https://images.craigslist.org";
const IMAGE_SUFFIX: &str = "_600x450.jpg";

struct Selectors {
    row: Selector,
    title_link: Selector,
    price: Selector,
    hood: Selector,
    time: Selector,
    housing: Selector,
    gallery: Selector,
}

impl Selectors {
    fn new() -> Result<Self, ScraperError> {
        let parse =
            |css: &str| Selector::parse(css).map_err(|e| ScraperError::HtmlParse(e.to_string()));

        Ok(Self {
            row: parse("li.result-row")?,
            title_link: parse("a.hdrlnk")?,
            price: parse("span.result-price")?,
            hood: parse("span.result-hood")?,
            time: parse("time")?,
            housing: parse("span.housing")?,
            gallery: parse("a.result-image[data-ids]")?,
        })
    }
}

/// Turns raw result rows into [`Listing`]s.
pub struct ListingExtractor {
    selectors: Selectors,
    base: Url,
    require_photos: bool,
}

impl ListingExtractor {
    /// `base` is the search page URL; relative listing links are resolved against it.
    pub fn new(base: Url, require_photos: bool) -> Result<Self, ScraperError> {
        Ok(Self {
            selectors: Selectors::new()?,
            base,
            require_photos,
        })
    }

    /// All listing fragments on a results page, in document order.
    pub fn fragments<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selectors.row).collect()
    }

    pub fn extract(&self, fragment: ElementRef<'_>) -> Result<Listing, ExtractError> {
        let s = &self.selectors;

        let href = fragment
            .select(&s.title_link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or(ExtractError::MissingField("title link"))?;
        let url = self
            .base
            .join(href.trim())
            .map(String::from)
            .map_err(|_| ExtractError::MissingField("title link"))?;

        let price_text = fragment
            .select(&s.price)
            .next()
            .map(text_of)
            .ok_or(ExtractError::MissingField("price"))?;
        let price = parse_price(&price_text)?;

        let posted_at = fragment
            .select(&s.time)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .ok_or(ExtractError::MissingField("posted time"))?
            .to_string();

        let neighborhood = fragment
            .select(&s.hood)
            .next()
            .map(|h| clean_neighborhood(&text_of(h)))
            .unwrap_or_default();

        let (bedrooms, size_sqft) = fragment
            .select(&s.housing)
            .next()
            .map(|h| parse_housing(&text_of(h)))
            .unwrap_or((None, None));

        let photo_urls = fragment
            .select(&s.gallery)
            .next()
            .and_then(|a| a.value().attr("data-ids"))
            .map(photo_urls)
            .unwrap_or_default();

        if self.require_photos && photo_urls.is_empty() {
            return Err(ExtractError::NoPhotos);
        }

        Ok(Listing {
            url,
            posted_at,
            price,
            neighborhood,
            photo_urls,
            bedrooms,
            size_sqft,
        })
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// `"$1,950"` -> `1950.0`. Any leading currency symbol and thousands separators are dropped.
pub fn parse_price(raw: &str) -> Result<f64, ExtractError> {
    let digits: String = raw
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    digits
        .trim()
        .parse::<f64>()
        .map_err(|_| ExtractError::BadPrice(raw.trim().to_string()))
}

/// `" (inner richmond) "` -> `"inner richmond"`
fn clean_neighborhood(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string()
}

/// Image ids come as `"1:00a0a_abc,1:00b0b_def"`; the part before `:` is a host index
/// we don't need.
pub fn photo_urls(data_ids: &str) -> Vec<String> {
    data_ids
        .split(',')
        .map(str::trim)
        .filter_map(|id| {
            let id = id.split_once(':').map(|(_, rest)| rest).unwrap_or(id);
            (!id.is_empty()).then(|| format!("{IMAGE_HOST}/{id}{IMAGE_SUFFIX}"))
        })
        .collect()
}
