// src/poll/cycle.rs

use crate::domain::new_listings;
use crate::errors::CycleError;
use crate::notify::{DispatchReport, NotificationDispatcher};
use crate::scraper::{PageSource, PaginatedFetcher};
use crate::sleeper::Sleeper;
use crate::store::StateStore;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Idle,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fetching => write!(f, "fetching"),
            Phase::Idle => write!(f, "idle"),
        }
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub pages: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub new: usize,
    pub dispatch: DispatchReport,
}

/// fetch -> diff -> notify -> persist, once per interval, forever.
pub struct PollCycle<S> {
    fetcher: PaginatedFetcher<S>,
    store: StateStore,
    dispatcher: NotificationDispatcher,
    sleeper: Box<dyn Sleeper>,
    interval: Duration,
}

impl<S: PageSource> PollCycle<S> {
    pub fn new(
        fetcher: PaginatedFetcher<S>,
        store: StateStore,
        dispatcher: NotificationDispatcher,
        sleeper: Box<dyn Sleeper>,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            dispatcher,
            sleeper,
            interval,
        }
    }

    /// One full cycle. The snapshot is only replaced after a complete sweep, so a
    /// failed sweep leaves the previous snapshot in place for the next attempt.
    pub fn run_once(&self) -> Result<CycleReport, CycleError> {
        let started_at = Utc::now();

        let previous = self.store.load()?;
        if previous.is_empty() {
            info!("No previous results found, starting a new set of listings");
        }

        let sweep = self.fetcher.sweep()?;
        let fresh = new_listings(&sweep.listings, &previous);
        if fresh.is_empty() {
            info!("No new listings were found");
        } else {
            info!("🏠 Found {} new listings", fresh.len());
        }

        let dispatch = self.dispatcher.dispatch(&fresh);
        let new = fresh.len();

        self.store.save(&sweep.listings)?;
        info!(
            "💾 Saved {} listings to {}",
            sweep.listings.len(),
            self.store.path().display()
        );

        Ok(CycleReport {
            started_at,
            pages: sweep.pages,
            fetched: sweep.listings.len(),
            skipped: sweep.skipped,
            new,
            dispatch,
        })
    }

    /// Never returns. Each cycle's errors are logged and the loop carries on.
    pub fn run_forever(&self) -> ! {
        loop {
            info!("Entering {} phase", Phase::Fetching);
            match self.run_once() {
                Ok(report) => info!(
                    "✅ Cycle started {} done: {} pages, {} listings ({} skipped), {} new, {} sent, {} stale, {} failed{}",
                    report.started_at.to_rfc3339(),
                    report.pages,
                    report.fetched,
                    report.skipped,
                    report.new,
                    report.dispatch.sent,
                    report.dispatch.stale,
                    report.dispatch.failed,
                    if report.dispatch.suppressed { " (suppressed)" } else { "" },
                ),
                Err(e) => error!("❌ Cycle failed: {e}"),
            }

            info!("Entering {} phase for {}s", Phase::Idle, self.interval.as_secs());
            self.sleeper.sleep(self.interval);
        }
    }
}
