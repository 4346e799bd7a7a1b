use crate::models::{PreferenceFilter, Property, SeenRecord, Subscriber};
use crate::storage::{PreferenceUpdate, PropertyStore};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProperty {
    property: Property,
    first_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPreference {
    filter: PreferenceFilter,
    active: bool,
}

/// Everything the store knows, in a shape that serializes as one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    subscribers: BTreeMap<i64, Subscriber>,
    #[serde(default)]
    preferences: BTreeMap<i64, StoredPreference>,
    /// Keyed by fingerprint
    #[serde(default)]
    properties: BTreeMap<String, StoredProperty>,
    #[serde(default)]
    seen: BTreeMap<String, SeenRecord>,
    /// Dates whose insert loop ran to the end
    #[serde(default)]
    complete_dates: BTreeSet<NaiveDate>,
}

/// Store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().clone()
    }

    /// Number of stored properties
    pub fn property_count(&self) -> usize {
        self.lock().properties.len()
    }

    /// Seen record for a fingerprint, if delivered
    pub fn seen_record(&self, fingerprint: &str) -> Option<SeenRecord> {
        self.lock().seen.get(fingerprint).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreSnapshot> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn cached_dates(&self) -> Result<HashSet<NaiveDate>> {
        Ok(self.lock().complete_dates.iter().copied().collect())
    }

    async fn mark_date_complete(&self, date: NaiveDate) -> Result<()> {
        self.lock().complete_dates.insert(date);
        Ok(())
    }

    async fn load_properties(&self, date: NaiveDate) -> Result<Vec<Property>> {
        let mut properties: Vec<Property> = self
            .lock()
            .properties
            .values()
            .filter(|stored| stored.property.sale_date == date)
            .map(|stored| stored.property.clone())
            .collect();
        properties.sort_by_key(|p| p.property_number);
        Ok(properties)
    }

    async fn insert_if_absent(&self, property: &Property) -> Result<bool> {
        let mut state = self.lock();
        if state.properties.contains_key(property.fingerprint()) {
            return Ok(false);
        }
        state.properties.insert(
            property.fingerprint().to_string(),
            StoredProperty {
                property: property.clone(),
                first_seen_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn is_seen(&self, fingerprint: &str) -> Result<bool> {
        Ok(self.lock().seen.contains_key(fingerprint))
    }

    async fn mark_seen(&self, fingerprint: &str) -> Result<()> {
        self.lock()
            .seen
            .entry(fingerprint.to_string())
            .or_insert_with(|| SeenRecord {
                fingerprint: fingerprint.to_string(),
                first_seen_at: Utc::now(),
            });
        Ok(())
    }

    async fn active_subscribers(&self) -> Result<Vec<(Subscriber, Option<PreferenceFilter>)>> {
        let state = self.lock();
        Ok(state
            .subscribers
            .values()
            .map(|subscriber| {
                let filter = state
                    .preferences
                    .get(&subscriber.id)
                    .filter(|pref| pref.active)
                    .map(|pref| pref.filter.clone());
                (subscriber.clone(), filter)
            })
            .collect())
    }

    async fn upsert_subscriber(
        &self,
        id: i64,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<Subscriber> {
        let mut state = self.lock();
        let subscriber = state.subscribers.entry(id).or_insert_with(|| Subscriber {
            id,
            chat_id,
            username: username.clone(),
            created_at: Utc::now(),
        });
        subscriber.chat_id = chat_id;
        subscriber.username = username;
        Ok(subscriber.clone())
    }

    async fn set_preference(&self, subscriber_id: i64, update: PreferenceUpdate) -> Result<()> {
        let mut state = self.lock();
        if !state.subscribers.contains_key(&subscriber_id) {
            bail!("Unknown subscriber {}", subscriber_id);
        }
        let stored = state
            .preferences
            .entry(subscriber_id)
            .or_insert_with(|| StoredPreference {
                filter: PreferenceFilter::default(),
                active: true,
            });
        if update.min_price.is_some() {
            stored.filter.min_price = update.min_price;
        }
        if update.max_price.is_some() {
            stored.filter.max_price = update.max_price;
        }
        if let Some(keywords) = update.location_keywords {
            stored.filter.location_keywords = keywords;
        }
        stored.active = true;
        Ok(())
    }

    async fn clear_preference(&self, subscriber_id: i64) -> Result<()> {
        if let Some(stored) = self.lock().preferences.get_mut(&subscriber_id) {
            stored.active = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReserveType;

    fn property(number: u32, text: &str) -> Property {
        Property::new(
            NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            number,
            text,
            None,
            ReserveType::Unknown,
            None,
            "",
        )
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_idempotent() {
        let store = MemoryStore::new();
        let p = property(1, "12 Long Street, Roodepoort");
        assert!(store.insert_if_absent(&p).await.unwrap());
        assert!(!store.insert_if_absent(&p).await.unwrap());
        assert_eq!(store.property_count(), 1);
    }

    #[tokio::test]
    async fn test_cached_dates_and_load_order() {
        let store = MemoryStore::new();
        store.insert_if_absent(&property(2, "second listing text")).await.unwrap();
        store.insert_if_absent(&property(1, "first listing text")).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
        assert!(store.cached_dates().await.unwrap().is_empty());
        store.mark_date_complete(date).await.unwrap();
        assert_eq!(store.cached_dates().await.unwrap(), HashSet::from([date]));

        let numbers: Vec<u32> = store
            .load_properties(date)
            .await
            .unwrap()
            .iter()
            .map(|p| p.property_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_mark_seen_keeps_first_timestamp() {
        let store = MemoryStore::new();
        store.mark_seen("abc").await.unwrap();
        let first = store.seen_record("abc").unwrap();
        store.mark_seen("abc").await.unwrap();
        assert_eq!(store.seen_record("abc").unwrap(), first);
        assert!(store.is_seen("abc").await.unwrap());
        assert!(!store.is_seen("def").await.unwrap());
    }

    #[tokio::test]
    async fn test_preference_merge_and_clear() {
        let store = MemoryStore::new();
        store.upsert_subscriber(7, 700, None).await.unwrap();

        store
            .set_preference(
                7,
                PreferenceUpdate {
                    max_price: Some(500000.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .set_preference(
                7,
                PreferenceUpdate {
                    location_keywords: Some(vec!["Roodepoort".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let subs = store.active_subscribers().await.unwrap();
        let filter = subs[0].1.clone().unwrap();
        assert_eq!(filter.max_price, Some(500000.0));
        assert_eq!(filter.location_keywords, vec!["Roodepoort".to_string()]);

        store.clear_preference(7).await.unwrap();
        assert!(store.active_subscribers().await.unwrap()[0].1.is_none());
    }

    #[tokio::test]
    async fn test_preference_for_unknown_subscriber_fails() {
        let store = MemoryStore::new();
        assert!(store.set_preference(1, PreferenceUpdate::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_upsert_subscriber_refreshes_address() {
        let store = MemoryStore::new();
        let first = store.upsert_subscriber(1, 10, Some("ann".into())).await.unwrap();
        let second = store.upsert_subscriber(1, 11, None).await.unwrap();
        assert_eq!(second.chat_id, 11);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.active_subscribers().await.unwrap().len(), 1);
    }
}
