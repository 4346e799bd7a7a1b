//! Sheriff sale-in-execution scout.
//!
//! Fetches published auction documents, turns them into fingerprinted
//! property records, and notifies subscribers about listings they have not
//! been told about yet.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod scrapers;
pub mod storage;

pub use config::Config;
pub use error::{DispatchError, FetchError};
pub use models::{PreferenceFilter, Property, ReserveType, SeenRecord, Subscriber};
pub use pipeline::{Pipeline, RunOutcome, RunSummary};
