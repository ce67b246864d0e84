// src/domain/listing.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One normalized classifieds entry.
///
/// `url` is the listing's identity: it keys both the per-sweep result set and the
/// persisted snapshot. Bedrooms and size are opaque display strings taken from the
/// source text; `None` means the source didn't say, and is written to disk as `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub url: String,
    pub posted_at: String,
    pub price: f64,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default, with = "sentinel")]
    pub bedrooms: Option<String>,
    #[serde(default, with = "sentinel")]
    pub size_sqft: Option<String>,
}

/// Listings keyed by identity. Ordered so logs and tests see a stable iteration order.
pub type ListingSet = BTreeMap<String, Listing>;

/// Keys present in `current` but not in `previous`.
pub fn new_listings<'a>(current: &'a ListingSet, previous: &ListingSet) -> Vec<&'a Listing> {
    current
        .iter()
        .filter(|(url, _)| !previous.contains_key(*url))
        .map(|(_, listing)| listing)
        .collect()
}

/// `0` on disk means "not specified".
mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(v),
            None => s.serialize_u8(0),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if s.trim().is_empty() || s.trim() == "0" => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }
}
