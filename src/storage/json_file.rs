use crate::models::{PreferenceFilter, Property, Subscriber};
use crate::storage::memory::{MemoryStore, StoreSnapshot};
use crate::storage::{PreferenceUpdate, PropertyStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Store persisted as a single pretty-printed JSON document.
///
/// Every mutation rewrites the file through a temporary sibling and a rename,
/// so a crash mid-write leaves the previous snapshot in place.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let snapshot = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read store {}", path.display()))?;
            let snapshot: StoreSnapshot = serde_json::from_str(&json)
                .with_context(|| format!("Store {} is not valid JSON", path.display()))?;
            info!("💾 Loaded store from {}", path.display());
            snapshot
        } else {
            info!("💾 Starting new store at {}", path.display());
            StoreSnapshot::default()
        };

        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
        })
    }

    async fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.inner.snapshot())?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved store to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl PropertyStore for JsonFileStore {
    async fn cached_dates(&self) -> Result<HashSet<NaiveDate>> {
        self.inner.cached_dates().await
    }

    async fn mark_date_complete(&self, date: NaiveDate) -> Result<()> {
        if self.inner.cached_dates().await?.contains(&date) {
            return Ok(());
        }
        self.inner.mark_date_complete(date).await?;
        self.persist().await
    }

    async fn load_properties(&self, date: NaiveDate) -> Result<Vec<Property>> {
        self.inner.load_properties(date).await
    }

    async fn insert_if_absent(&self, property: &Property) -> Result<bool> {
        let inserted = self.inner.insert_if_absent(property).await?;
        if inserted {
            self.persist().await?;
        }
        Ok(inserted)
    }

    async fn is_seen(&self, fingerprint: &str) -> Result<bool> {
        self.inner.is_seen(fingerprint).await
    }

    async fn mark_seen(&self, fingerprint: &str) -> Result<()> {
        if self.inner.is_seen(fingerprint).await? {
            return Ok(());
        }
        self.inner.mark_seen(fingerprint).await?;
        self.persist().await
    }

    async fn active_subscribers(&self) -> Result<Vec<(Subscriber, Option<PreferenceFilter>)>> {
        self.inner.active_subscribers().await
    }

    async fn upsert_subscriber(
        &self,
        id: i64,
        chat_id: i64,
        username: Option<String>,
    ) -> Result<Subscriber> {
        let subscriber = self.inner.upsert_subscriber(id, chat_id, username).await?;
        self.persist().await?;
        Ok(subscriber)
    }

    async fn set_preference(&self, subscriber_id: i64, update: PreferenceUpdate) -> Result<()> {
        self.inner.set_preference(subscriber_id, update).await?;
        self.persist().await
    }

    async fn clear_preference(&self, subscriber_id: i64) -> Result<()> {
        self.inner.clear_preference(subscriber_id).await?;
        self.persist().await
    }
}
