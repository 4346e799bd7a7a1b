use crate::error::FetchError;
use crate::scrapers::types::FetchOutcome;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Common trait for sources that publish sale-in-execution documents.
/// The coordinator only talks to this seam, so tests can stand in a fake.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Sale dates currently visible on the source calendar, in calendar order
    async fn list_open_dates(&self) -> Result<Vec<NaiveDate>, FetchError>;

    /// Fetch the document for one sale date
    async fn fetch_document(&self, date: NaiveDate) -> Result<FetchOutcome, FetchError>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
