// src/notify/dispatcher.rs

use crate::domain::Listing;
use crate::notify::{BotTransport, LinkProbe, TransportError};
use crate::sleeper::Sleeper;
use std::time::Duration;
use tracing::{error, info, warn};

/// Listings with more photos than this only get [`PHOTO_SUBSET`] of them sent.
pub const MAX_PHOTOS: usize = 10;
pub const PHOTO_SUBSET: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct DispatchLimits {
    /// Above this many new listings in one cycle, nothing is sent at all.
    pub max_number: usize,
    /// Above this many new listings, text still goes out but photo groups don't.
    pub max_photo_number: usize,
    /// Longest rate-limit pause honored, whatever `retry_after` the server asks for.
    pub max_retry_wait: Duration,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub suppressed: bool,
    pub sent: usize,
    pub stale: usize,
    pub failed: usize,
    pub photo_batches: usize,
}

pub struct NotificationDispatcher {
    transport: Box<dyn BotTransport>,
    probe: Box<dyn LinkProbe>,
    sleeper: Box<dyn Sleeper>,
    limits: DispatchLimits,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Box<dyn BotTransport>,
        probe: Box<dyn LinkProbe>,
        sleeper: Box<dyn Sleeper>,
        limits: DispatchLimits,
    ) -> Self {
        Self {
            transport,
            probe,
            sleeper,
            limits,
        }
    }

    /// Announce every listing in `new`, unless there are suspiciously many of them.
    ///
    /// Per-listing failures are logged and counted; they never stop the batch.
    pub fn dispatch(&self, new: &[&Listing]) -> DispatchReport {
        let mut report = DispatchReport::default();

        if new.len() > self.limits.max_number {
            warn!(
                "🚫 {} new listings exceeds MAX_NUMBER={}, skipping notifications this cycle",
                new.len(),
                self.limits.max_number
            );
            report.suppressed = true;
            return report;
        }

        let send_photos = new.len() <= self.limits.max_photo_number;
        if !send_photos {
            info!(
                "{} new listings exceeds MAX_PHOTO_NUMBER={}, sending text only",
                new.len(),
                self.limits.max_photo_number
            );
        }

        for listing in new {
            self.notify(listing, send_photos, &mut report);
        }

        report
    }

    fn notify(&self, listing: &Listing, send_photos: bool, report: &mut DispatchReport) {
        match self.probe.is_live(&listing.url) {
            Ok(true) => {}
            Ok(false) => {
                info!("Listing {} no longer resolves, skipping", listing.url);
                report.stale += 1;
                return;
            }
            Err(e) => {
                warn!("Could not reach {}: {e}", listing.url);
                report.stale += 1;
                return;
            }
        }

        let text = compose_message(listing);
        info!("📨 {}", text.replace('\n', " | "));
        match self.send_text(&text) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                error!("Failed to send message for {}: {e}", listing.url);
                report.failed += 1;
            }
        }

        if !send_photos {
            return;
        }
        if let Some(batch) = photo_batch(&listing.photo_urls) {
            match self.transport.send_media_group(batch) {
                Ok(()) => report.photo_batches += 1,
                Err(e) => warn!("Failed to send photos for {}: {e}", listing.url),
            }
        }
    }

    /// One retry, after waiting out the server's `retry_after` plus a second.
    fn send_text(&self, text: &str) -> Result<(), TransportError> {
        match self.transport.send_message(text) {
            Err(TransportError::RateLimited { retry_after }) => {
                let wait = Duration::from_secs(retry_after.saturating_add(1))
                    .min(self.limits.max_retry_wait);
                warn!("⏳ Rate limited, retrying in {}s", wait.as_secs());
                self.sleeper.sleep(wait);
                self.transport.send_message(text)
            }
            other => other,
        }
    }
}

pub fn compose_message(listing: &Listing) -> String {
    let mut text = format!(
        "{} {} {}",
        listing.url,
        listing.neighborhood,
        format_price(listing.price)
    );
    if let Some(bedrooms) = &listing.bedrooms {
        text.push_str(&format!("\nBedrooms: {bedrooms}"));
    }
    if let Some(size) = &listing.size_sqft {
        text.push_str(&format!("\nSize: {size} ft2"));
    }
    text
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${price:.0}")
    } else {
        format!("${price:.2}")
    }
}

/// Photos worth sending as a group: none for zero or one photo, a leading subset
/// when there are too many for one batch.
pub fn photo_batch(photos: &[String]) -> Option<&[String]> {
    match photos.len() {
        0 | 1 => None,
        n if n > MAX_PHOTOS => Some(&photos[..PHOTO_SUBSET]),
        _ => Some(photos),
    }
}
