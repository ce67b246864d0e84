use crate::config::Config;
use crate::notify::{DispatchLimits, HttpLinkProbe, NotificationDispatcher, TelegramClient};
use crate::poll::PollCycle;
use crate::scraper::{search_url, HttpPageSource, ListingExtractor, PaginatedFetcher};
use crate::sleeper::ThreadSleeper;
use crate::store::StateStore;
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod domain;
mod errors;
mod notify;
mod poll;
mod scraper;
mod sleeper;
mod store;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1️⃣ Config and wiring; any failure here exits before the loop starts
    let cycle = match build() {
        Ok(cycle) => cycle,
        Err(e) => {
            tracing::error!("❌ Startup failed: {e:#}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Poll until killed
    cycle.run_forever();
}

fn build() -> anyhow::Result<PollCycle<HttpPageSource>> {
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded, polling every {}s", config.poll_interval.as_secs());

    let store = StateStore::open(config.state_path()).context("Failed to prepare data directory")?;

    let base = search_url(&config.search, 0).context("Invalid search URL")?;
    let extractor = ListingExtractor::new(base, config.require_photos)?;
    let source = HttpPageSource::new(config.search.clone(), config.http_timeout)?;
    let fetcher =
        PaginatedFetcher::new(source, extractor, Box::new(ThreadSleeper), config.max_pages);

    let transport = TelegramClient::new(
        config.bot_url.clone(),
        config.chat_id.clone(),
        config.http_timeout,
    )?;
    let probe = HttpLinkProbe::new(config.http_timeout)?;
    let dispatcher = NotificationDispatcher::new(
        Box::new(transport),
        Box::new(probe),
        Box::new(ThreadSleeper),
        DispatchLimits {
            max_number: config.max_number,
            max_photo_number: config.max_photo_number,
            max_retry_wait: config.poll_interval,
        },
    );

    Ok(PollCycle::new(
        fetcher,
        store,
        dispatcher,
        Box::new(ThreadSleeper),
        config.poll_interval,
    ))
}
