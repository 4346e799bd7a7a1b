use crate::models::Property;
use crate::parser::parse_properties;
use crate::scrapers::{DocumentSource, FetchOutcome};
use crate::storage::PropertyStore;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

/// What one ingestion pass found
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Known properties not yet delivered to anyone
    pub candidates: Vec<Property>,
    /// Known properties that already have a seen record
    pub seen: Vec<Property>,
    /// Dates served from the store without fetching
    pub cache_hits: Vec<NaiveDate>,
    /// Dates whose document was fetched and parsed
    pub fetched: Vec<NaiveDate>,
    /// Dates whose document is not published yet
    pub deferred: Vec<NaiveDate>,
    /// Dates whose fetch failed this run
    pub failed: Vec<(NaiveDate, String)>,
    /// Properties newly written to the store
    pub inserted: usize,
}

/// Decides per sale date between the store and a fresh fetch
pub struct IngestionCoordinator<'a> {
    source: &'a dyn DocumentSource,
    store: &'a dyn PropertyStore,
}

impl<'a> IngestionCoordinator<'a> {
    pub fn new(source: &'a dyn DocumentSource, store: &'a dyn PropertyStore) -> Self {
        Self { source, store }
    }

    /// Collect every property known for `dates`, split into seen and candidates.
    ///
    /// Dates in `cached` are loaded from the store and never fetched. A fetch
    /// failure only drops its own date; store errors abort the pass.
    pub async fn ingest(
        &self,
        dates: &[NaiveDate],
        cached: &HashSet<NaiveDate>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut known: Vec<Property> = Vec::new();

        for &date in dates {
            if cached.contains(&date) {
                let properties = self.store.load_properties(date).await?;
                info!(%date, count = properties.len(), "Using cached properties");
                report.cache_hits.push(date);
                known.extend(properties);
                continue;
            }

            let document = match self.source.fetch_document(date).await {
                Ok(FetchOutcome::Published(document)) => document,
                Ok(FetchOutcome::NotYetPublished) => {
                    info!(%date, "Document not published yet, retrying next run");
                    report.deferred.push(date);
                    continue;
                }
                Err(e) => {
                    warn!(%date, error = %e, "Fetch failed, skipping date this run");
                    report.failed.push((date, e.to_string()));
                    continue;
                }
            };

            let properties = parse_properties(&document.text, date, &document.url);
            info!(%date, count = properties.len(), "Parsed properties from document");

            for property in &properties {
                if self.store.insert_if_absent(property).await? {
                    report.inserted += 1;
                }
            }
            // An empty parse stays uncached so the next run looks again.
            if !properties.is_empty() {
                self.store.mark_date_complete(date).await?;
            }
            report.fetched.push(date);
            known.extend(properties);
        }

        let mut fingerprints = HashSet::new();
        for property in known {
            if !fingerprints.insert(property.fingerprint().to_string()) {
                continue;
            }
            if self.store.is_seen(property.fingerprint()).await? {
                report.seen.push(property);
            } else {
                report.candidates.push(property);
            }
        }

        info!(
            candidates = report.candidates.len(),
            seen = report.seen.len(),
            inserted = report.inserted,
            "Ingestion finished"
        );
        Ok(report)
    }
}
