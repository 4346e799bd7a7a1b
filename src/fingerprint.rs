//! Stable identity for a listing across repeated scrapes.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Number of leading characters of the listing text that take part in the hash
pub const TEXT_WINDOW: usize = 80;

/// SHA-256 over `date|number|first 80 chars of text`, hex encoded.
///
/// Trailing text beyond the window never changes the result, so layout drift
/// at the end of a block between scrapes keeps the same identity.
pub fn fingerprint(sale_date: NaiveDate, property_number: u32, raw_text: &str) -> String {
    let window: String = raw_text.chars().take(TEXT_WINDOW).collect();
    let key = format!("{}|{}|{}", sale_date.format("%Y-%m-%d"), property_number, window);

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
