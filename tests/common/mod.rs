#![allow(dead_code)]

use async_trait::async_trait;
use auction_scout::error::{DispatchError, FetchError};
use auction_scout::models::{Property, Subscriber};
use auction_scout::notify::NotificationSink;
use auction_scout::scrapers::{DocumentSource, FetchOutcome, SourceDocument};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
}

pub enum Scripted {
    Text(&'static str),
    NotYetPublished,
    Fail,
}

/// Source answering from a script and recording every fetch
#[derive(Default)]
pub struct FakeSource {
    dates: Vec<NaiveDate>,
    documents: HashMap<NaiveDate, Scripted>,
    pub fetches: Mutex<Vec<NaiveDate>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: NaiveDate, doc: Scripted) -> Self {
        self.dates.push(date);
        self.documents.insert(date, doc);
        self
    }

    pub fn fetched(&self) -> Vec<NaiveDate> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for FakeSource {
    async fn list_open_dates(&self) -> Result<Vec<NaiveDate>, FetchError> {
        Ok(self.dates.clone())
    }

    async fn fetch_document(&self, date: NaiveDate) -> Result<FetchOutcome, FetchError> {
        self.fetches.lock().unwrap().push(date);
        match self.documents.get(&date) {
            Some(Scripted::Text(text)) => Ok(FetchOutcome::Published(SourceDocument {
                text: text.to_string(),
                url: format!("https://example.test/{}.pdf", date),
            })),
            Some(Scripted::Fail) => Err(FetchError::Status {
                url: format!("https://example.test/{}.pdf", date),
                status: 503,
            }),
            Some(Scripted::NotYetPublished) | None => Ok(FetchOutcome::NotYetPublished),
        }
    }

    fn source_name(&self) -> &'static str {
        "Fake"
    }
}

/// Sink that records deliveries and rejects chosen subscribers
#[derive(Default)]
pub struct RecordingSink {
    failing: HashSet<i64>,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(ids: &[i64]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn deliveries(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, subscriber: &Subscriber, property: &Property) -> Result<(), DispatchError> {
        if self.failing.contains(&subscriber.id) {
            return Err(DispatchError::Rejected {
                status: 403,
                body: "bot was blocked by the user".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((subscriber.id, property.fingerprint().to_string()));
        Ok(())
    }
}

pub const DOCUMENT: &str = "\
NO IMAGE ADDRESS DESCRIPTION
1. 123 Main Rd, Florida Park, Roodepoort
Dwelling with 3 bedrooms
500m²
R350000 Court Reserve
2. 45 Oak St, Helderkruin, Roodepoort
Sectional title unit
Bank Reserve
3. 9 Ridge Ave, Discovery, Roodepoort
Vacant stand
R150 000 Court Reserve
RULES OF SALE IN EXECUTION
";
