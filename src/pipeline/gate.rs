use crate::models::{PreferenceFilter, Property, Subscriber};
use crate::notify::NotificationSink;
use crate::pipeline::matcher::matches;
use crate::storage::PropertyStore;
use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One property and everyone who should receive it
#[derive(Debug)]
pub struct Dispatch<'a> {
    pub property: &'a Property,
    pub recipients: Vec<&'a Subscriber>,
}

/// Outcome of a notification pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// Successful sends
    pub dispatched: usize,
    /// Sends the sink rejected
    pub failed: usize,
    /// Fingerprints committed as seen
    pub marked_seen: usize,
    /// Candidates no subscriber matched; they stay candidates
    pub unmatched: usize,
}

/// Work out who gets which candidate.
///
/// When no subscriber has an active filter every candidate goes to every
/// subscriber. Subscribers are deduplicated by id.
pub fn plan_dispatches<'a>(
    candidates: &'a [Property],
    subscribers: &'a [(Subscriber, Option<PreferenceFilter>)],
) -> Vec<Dispatch<'a>> {
    let broadcast = subscribers.iter().all(|(_, filter)| filter.is_none());

    candidates
        .iter()
        .map(|property| {
            let mut ids = HashSet::new();
            let recipients = subscribers
                .iter()
                .filter(|(_, filter)| broadcast || matches(property, filter.as_ref()))
                .map(|(subscriber, _)| subscriber)
                .filter(|subscriber| ids.insert(subscriber.id))
                .collect();
            Dispatch {
                property,
                recipients,
            }
        })
        .collect()
}

/// Sends matched candidates and commits seen records afterwards.
///
/// A fingerprint is marked seen only once at least one send for it succeeded.
/// A crash between the send and the commit means the property is sent again on
/// the next run; it is never marked seen without a delivery.
pub struct NotificationGate<'a> {
    store: &'a dyn PropertyStore,
    sink: &'a dyn NotificationSink,
}

impl<'a> NotificationGate<'a> {
    pub fn new(store: &'a dyn PropertyStore, sink: &'a dyn NotificationSink) -> Self {
        Self { store, sink }
    }

    pub async fn notify(
        &self,
        candidates: &[Property],
        subscribers: &[(Subscriber, Option<PreferenceFilter>)],
    ) -> Result<GateReport> {
        let mut report = GateReport::default();

        for dispatch in plan_dispatches(candidates, subscribers) {
            let property = dispatch.property;

            if dispatch.recipients.is_empty() {
                debug!(
                    date = %property.sale_date,
                    number = property.property_number,
                    "No subscriber matched"
                );
                report.unmatched += 1;
                continue;
            }

            let mut delivered = false;
            for subscriber in dispatch.recipients {
                match self.sink.send(subscriber, property).await {
                    Ok(()) => {
                        report.dispatched += 1;
                        delivered = true;
                    }
                    Err(e) => {
                        warn!(
                            subscriber = subscriber.id,
                            date = %property.sale_date,
                            number = property.property_number,
                            error = %e,
                            "Dispatch failed"
                        );
                        report.failed += 1;
                    }
                }
            }

            if delivered {
                self.store.mark_seen(property.fingerprint()).await?;
                report.marked_seen += 1;
            }
        }

        info!(
            dispatched = report.dispatched,
            failed = report.failed,
            marked_seen = report.marked_seen,
            unmatched = report.unmatched,
            "Notification pass finished"
        );
        Ok(report)
    }
}
