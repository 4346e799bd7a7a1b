//! One scrape-and-notify pass over the sale calendar.

pub mod coordinator;
pub mod gate;
pub mod matcher;

pub use coordinator::{IngestReport, IngestionCoordinator};
pub use gate::{plan_dispatches, Dispatch, GateReport, NotificationGate};
pub use matcher::matches;

use crate::notify::NotificationSink;
use crate::scrapers::DocumentSource;
use crate::storage::PropertyStore;
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Counters for one completed pass
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dates_visible: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub deferred: usize,
    pub failed: usize,
    pub inserted: usize,
    pub already_seen: usize,
    pub candidates: usize,
    pub dispatched: usize,
    pub failed_dispatches: usize,
    pub marked_seen: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Another pass was already running against this store
    Skipped,
}

/// Wires the three collaborators together and guards against overlapping runs
pub struct Pipeline {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn PropertyStore>,
    sink: Arc<dyn NotificationSink>,
    running: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn PropertyStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            source,
            store,
            sink,
            running: Mutex::new(()),
        }
    }

    /// Run one pass for sale dates on or after `today`
    pub async fn run_once(&self, today: NaiveDate) -> Result<RunOutcome> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("A run is already in progress, skipping");
            return Ok(RunOutcome::Skipped);
        };

        info!("Starting scrape from {}", self.source.source_name());

        let dates: Vec<NaiveDate> = match self.source.list_open_dates().await {
            Ok(dates) => dates.into_iter().filter(|d| *d >= today).collect(),
            Err(e) => {
                error!(error = %e, "Could not read the sale calendar, nothing done this run");
                return Ok(RunOutcome::Completed(RunSummary::default()));
            }
        };
        info!("Upcoming sale dates: {}", dates.len());

        let visible: HashSet<NaiveDate> = dates.iter().copied().collect();
        let cached: HashSet<NaiveDate> = self
            .store
            .cached_dates()
            .await?
            .intersection(&visible)
            .copied()
            .collect();
        if !cached.is_empty() {
            info!("Store already covers {} of them, skipping those downloads", cached.len());
        }

        let ingest = IngestionCoordinator::new(self.source.as_ref(), self.store.as_ref())
            .ingest(&dates, &cached)
            .await?;

        let subscribers = self.store.active_subscribers().await?;
        let gate = NotificationGate::new(self.store.as_ref(), self.sink.as_ref())
            .notify(&ingest.candidates, &subscribers)
            .await?;

        let summary = RunSummary {
            dates_visible: dates.len(),
            cache_hits: ingest.cache_hits.len(),
            fetched: ingest.fetched.len(),
            deferred: ingest.deferred.len(),
            failed: ingest.failed.len(),
            inserted: ingest.inserted,
            already_seen: ingest.seen.len(),
            candidates: ingest.candidates.len(),
            dispatched: gate.dispatched,
            failed_dispatches: gate.failed,
            marked_seen: gate.marked_seen,
        };
        info!("✅ Run done. New properties notified: {}", summary.marked_seen);

        Ok(RunOutcome::Completed(summary))
    }
}
