//! Persistence seam for properties, seen records and subscribers.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::models::{PreferenceFilter, Property, Subscriber};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Partial preference update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceUpdate {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location_keywords: Option<Vec<String>>,
}

/// CRUD contract the pipeline relies on.
///
/// Property rows are insert-if-absent only and seen records are never
/// removed, so implementations need no update-in-place for either.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Sale dates whose document was stored in full
    async fn cached_dates(&self) -> Result<HashSet<NaiveDate>>;

    /// Record that every property parsed for `date` is stored
    async fn mark_date_complete(&self, date: NaiveDate) -> Result<()>;

    /// Stored properties for a date, by property number
    async fn load_properties(&self, date: NaiveDate) -> Result<Vec<Property>>;

    /// Insert unless the fingerprint is already stored; returns whether it was inserted
    async fn insert_if_absent(&self, property: &Property) -> Result<bool>;

    async fn is_seen(&self, fingerprint: &str) -> Result<bool>;

    /// Record that a fingerprint was delivered; repeated calls are no-ops
    async fn mark_seen(&self, fingerprint: &str) -> Result<()>;

    /// Every subscriber with their filter, when one is active
    async fn active_subscribers(&self) -> Result<Vec<(Subscriber, Option<PreferenceFilter>)>>;

    /// Register a subscriber or refresh their delivery address
    async fn upsert_subscriber(
        &self,
        id: i64,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<Subscriber>;

    /// Merge an update into the subscriber's filter and make it active
    async fn set_preference(&self, subscriber_id: i64, update: PreferenceUpdate) -> Result<()>;

    /// Deactivate the subscriber's filter, so everything matches again
    async fn clear_preference(&self, subscriber_id: i64) -> Result<()>;
}
