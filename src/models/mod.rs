use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fingerprint;

/// Reserve policy printed next to an auctioned property
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReserveType {
    /// Court-set reserve, normally with an amount
    Court,
    /// Floor set by the bondholder, amount not published
    Bank,
    /// "No Court Reserve": any bid can win
    #[serde(rename = "none")]
    NoReserve,
    Unknown,
}

impl ReserveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReserveType::Court => "court",
            ReserveType::Bank => "bank",
            ReserveType::NoReserve => "none",
            ReserveType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReserveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One auction listing parsed out of a sale-in-execution document.
///
/// Records are never mutated after construction. A re-parse of the same
/// document produces a new value that is compared by `fingerprint`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub sale_date: NaiveDate,
    pub property_number: u32,
    pub raw_text: String,
    pub size_m2: Option<f64>,
    pub reserve_type: ReserveType,
    pub reserve_price: Option<f64>,
    pub source_url: String,
    fingerprint: String,
}

impl Property {
    /// Build a property and derive its fingerprint from the identity fields
    pub fn new(
        sale_date: NaiveDate,
        property_number: u32,
        raw_text: impl Into<String>,
        size_m2: Option<f64>,
        reserve_type: ReserveType,
        reserve_price: Option<f64>,
        source_url: impl Into<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        let fingerprint = fingerprint::fingerprint(sale_date, property_number, &raw_text);
        Self {
            sale_date,
            property_number,
            raw_text,
            size_m2,
            reserve_type,
            reserve_price,
            source_url: source_url.into(),
            fingerprint,
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// No-reserve and bank-reserve sales are never filtered out
    pub fn is_opportunity(&self) -> bool {
        matches!(self.reserve_type, ReserveType::NoReserve | ReserveType::Bank)
    }

    /// Human readable reserve line for notifications
    pub fn reserve_display(&self) -> String {
        match (self.reserve_type, self.reserve_price) {
            (ReserveType::NoReserve, _) => "⚡ *NO COURT RESERVE - any bid wins*".to_string(),
            (ReserveType::Bank, _) => "🏦 *Bank Reserve* (floor set by bank)".to_string(),
            (ReserveType::Court, Some(price)) => {
                format!("💰 Court Reserve: R {}", group_thousands(price))
            }
            _ => "❓ Reserve unknown".to_string(),
        }
    }
}

/// Render a whole-number amount with comma thousands separators
pub fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

/// A registered recipient of notifications
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscriber {
    pub id: i64,
    /// Chat the messaging API delivers to
    pub chat_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Price and location constraints for one subscriber
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreferenceFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substrings; empty means no location constraint
    #[serde(default)]
    pub location_keywords: Vec<String>,
}

/// Durable fact that a fingerprint has been delivered at least once
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeenRecord {
    pub fingerprint: String,
    pub first_seen_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(reserve_type: ReserveType, reserve_price: Option<f64>) -> Property {
        Property::new(
            NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            3,
            "12 Long Street, Roodepoort",
            None,
            reserve_type,
            reserve_price,
            "",
        )
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(350000.0), "350,000");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
    }

    #[test]
    fn test_opportunity_flags() {
        assert!(sample(ReserveType::NoReserve, None).is_opportunity());
        assert!(sample(ReserveType::Bank, None).is_opportunity());
        assert!(!sample(ReserveType::Court, Some(1.0)).is_opportunity());
        assert!(!sample(ReserveType::Unknown, None).is_opportunity());
    }

    #[test]
    fn test_reserve_display() {
        assert_eq!(
            sample(ReserveType::Court, Some(350000.0)).reserve_display(),
            "💰 Court Reserve: R 350,000"
        );
        assert_eq!(
            sample(ReserveType::Court, None).reserve_display(),
            "❓ Reserve unknown"
        );
    }

    #[test]
    fn test_reserve_type_serializes_lowercase() {
        let json = serde_json::to_string(&ReserveType::NoReserve).unwrap();
        assert_eq!(json, "\"none\"");
        let back: ReserveType = serde_json::from_str("\"bank\"").unwrap();
        assert_eq!(back, ReserveType::Bank);
    }
}
