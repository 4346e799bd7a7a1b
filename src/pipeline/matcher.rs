use crate::models::{PreferenceFilter, Property};

/// Decide whether a subscriber with `filter` should hear about `property`.
///
/// No filter matches everything. No-reserve and bank-reserve sales bypass the
/// filter entirely. Otherwise a known reserve price must sit inside the
/// inclusive bounds (an unknown price is not excluded) and, when keywords are
/// set, one of them must appear in the listing text.
pub fn matches(property: &Property, filter: Option<&PreferenceFilter>) -> bool {
    let Some(filter) = filter else {
        return true;
    };

    if property.is_opportunity() {
        return true;
    }

    if let Some(price) = property.reserve_price {
        if !price_in_bounds(price, filter) {
            return false;
        }
    }

    location_matches(&property.raw_text, &filter.location_keywords)
}

/// Inclusive bounds; an unset bound is open
pub fn price_in_bounds(price: f64, filter: &PreferenceFilter) -> bool {
    filter.min_price.map_or(true, |min| price >= min)
        && filter.max_price.map_or(true, |max| price <= max)
}

/// True when no keywords are set or any keyword occurs, ignoring case
pub fn location_matches(text: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let text = text.to_lowercase();
    keywords.iter().any(|kw| text.contains(&kw.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReserveType;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn property(reserve_type: ReserveType, reserve_price: Option<f64>, text: &str) -> Property {
        Property::new(
            NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            1,
            text,
            None,
            reserve_type,
            reserve_price,
            "",
        )
    }

    fn filter(min: Option<f64>, max: Option<f64>, keywords: &[&str]) -> PreferenceFilter {
        PreferenceFilter {
            min_price: min,
            max_price: max,
            location_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_filter_matches_everything() {
        let p = property(ReserveType::Court, Some(9_000_000.0), "Sandton");
        assert!(matches(&p, None));
    }

    #[test]
    fn test_price_outside_bounds() {
        let p = property(ReserveType::Court, Some(350000.0), "123 Main Rd");
        assert!(!matches(&p, Some(&filter(Some(100000.0), Some(200000.0), &[]))));
        assert!(matches(&p, Some(&filter(Some(100000.0), Some(350000.0), &[]))));
        assert!(matches(&p, Some(&filter(None, None, &[]))));
    }

    #[test]
    fn test_bank_reserve_bypasses_filter() {
        let p = property(ReserveType::Bank, None, "45 Oak St");
        assert!(matches(&p, Some(&filter(Some(1.0), Some(2.0), &["Durban"]))));
    }

    #[test]
    fn test_unknown_price_passes_price_but_not_location() {
        let p = property(ReserveType::Unknown, None, "12 Long Street, Roodepoort");
        let f = filter(Some(100000.0), Some(200000.0), &["roodepoort"]);
        assert!(matches(&p, Some(&f)));

        let f = filter(Some(100000.0), Some(200000.0), &["Pretoria"]);
        assert!(!matches(&p, Some(&f)));
    }

    #[test]
    fn test_court_without_price_checks_location() {
        let p = property(ReserveType::Court, None, "9 Ridge Ave, KRUGERSDORP");
        assert!(matches(&p, Some(&filter(None, Some(1.0), &["Krugersdorp", "Benoni"]))));
    }

    #[test]
    fn test_price_and_location_are_conjunctive() {
        let p = property(ReserveType::Court, Some(150000.0), "7 Vaal Rd, Vereeniging");
        assert!(!matches(
            &p,
            Some(&filter(Some(100000.0), Some(200000.0), &["Alberton"]))
        ));
        assert!(matches(
            &p,
            Some(&filter(Some(100000.0), Some(200000.0), &["vereeniging"]))
        ));
    }

    proptest! {
        #[test]
        fn opportunities_always_match(
            bank in any::<bool>(),
            min in proptest::option::of(0.0f64..1e7),
            max in proptest::option::of(0.0f64..1e7),
            keyword in "[a-z]{1,12}",
        ) {
            let reserve = if bank { ReserveType::Bank } else { ReserveType::NoReserve };
            let p = property(reserve, None, "3 Unrelated Street");
            let f = PreferenceFilter { min_price: min, max_price: max, location_keywords: vec![keyword] };
            prop_assert!(matches(&p, Some(&f)));
        }

        #[test]
        fn price_component_follows_bounds(
            price in 0.0f64..1e7,
            lo in 0.0f64..1e7,
            hi in 0.0f64..1e7,
        ) {
            let p = property(ReserveType::Court, Some(price), "anywhere");
            let f = PreferenceFilter { min_price: Some(lo), max_price: Some(hi), location_keywords: vec![] };
            prop_assert_eq!(matches(&p, Some(&f)), lo <= price && price <= hi);
        }
    }
}
