// src/config.rs

use crate::errors::ConfigError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str =
    "https://sfbay.craigslist.org/d/apts-housing-for-rent/search/apa";
const TELEGRAM_API: &str = "https://api.telegram.org";

/// Where the listing search is pointed.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchTarget {
    /// Base URL plus the configured filter query parameters.
    Filtered {
        base_url: String,
        max_price: u32,
        search_distance: u32,
        postal: String,
    },
    /// A complete search URL used as-is; only the offset is appended.
    Direct(String),
}

/// Runtime settings, built once in `main` and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub chat_id: String,
    pub bot_url: String,
    pub search: SearchTarget,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub max_number: usize,
    pub max_photo_number: usize,
    pub require_photos: bool,
    pub max_pages: usize,
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from a `.env` file (if any) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit key/value map. Split out so tests don't touch the process env.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let chat_id = get("CHAT_ID").ok_or(ConfigError::Missing("CHAT_ID"))?.to_string();

        let bot_url = match (get("BOT_URL"), get("TOKEN")) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(token)) => format!("{TELEGRAM_API}/bot{token}"),
            (None, None) => return Err(ConfigError::Missing("BOT_URL or TOKEN")),
        };

        let search = match get("DIRECT_URL") {
            Some(url) => SearchTarget::Direct(url.to_string()),
            None => SearchTarget::Filtered {
                base_url: get("URL").unwrap_or(DEFAULT_SEARCH_URL).to_string(),
                max_price: parse_or(get("MAX_PRICE"), "MAX_PRICE", 2600)?,
                search_distance: parse_or(get("MAX_DISTANCE"), "MAX_DISTANCE", 2)?,
                postal: get("ZIP").unwrap_or("94118").to_string(),
            },
        };

        Ok(Self {
            chat_id,
            bot_url,
            search,
            poll_interval: Duration::from_secs(parse_or(get("CRAIG_TIMEOUT"), "CRAIG_TIMEOUT", 600)?),
            http_timeout: Duration::from_secs(parse_or(get("HTTP_TIMEOUT"), "HTTP_TIMEOUT", 30)?),
            max_number: parse_or(get("MAX_NUMBER"), "MAX_NUMBER", 20)?,
            max_photo_number: parse_or(get("MAX_PHOTO_NUMBER"), "MAX_PHOTO_NUMBER", 10)?,
            require_photos: parse_bool_or(get("REQUIRE_PHOTOS"), "REQUIRE_PHOTOS", true)?,
            max_pages: parse_positive_or(get("MAX_PAGES"), "MAX_PAGES", 25)?,
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or("data")),
        })
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("result.json")
    }
}

fn parse_or<T: FromStr>(raw: Option<&str>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
            key,
            value: v.to_string(),
        }),
    }
}

/// Zero would turn a sweep into a no-op that then overwrites the snapshot with nothing.
fn parse_positive_or(raw: Option<&str>, key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match parse_or(raw, key, default)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}

fn parse_bool_or(raw: Option<&str>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(v) = raw else {
        return Ok(default);
    };
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: v.to_string(),
        }),
    }
}
