//! Turns the text of a sale-in-execution document into `Property` records.

pub mod fields;

pub use fields::{extract_fields, parse_reserve, parse_size, ExtractedFields};

use crate::models::Property;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Numbered heading that opens a listing, e.g. `12. ` at the start of a line
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d{1,3})\.\s").expect("heading pattern must compile"));

/// Table header printed above the first listing
static SECTION_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)NO IMAGE\s+ADDRESS").expect("section pattern must compile"));

/// Boilerplate that follows the last listing
static SECTION_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:The properties listed above|RULES OF SALES? IN EXECUTION)")
        .expect("section pattern must compile")
});

/// Blocks shorter than this are stray numbering, not listings
pub const MIN_BLOCK_CHARS: usize = 20;

/// Parse every numbered listing in document order.
///
/// Headings are not re-sorted: malformed documents may number out of order and
/// the output mirrors what the document says. A document without headings
/// yields an empty vector.
pub fn parse_properties(text: &str, sale_date: NaiveDate, source_url: &str) -> Vec<Property> {
    let body = listing_section(text);

    let headings: Vec<(usize, usize, &str)> = HEADING_RE
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?;
            Some((whole.start(), whole.end(), number.as_str()))
        })
        .collect();

    let mut properties = Vec::with_capacity(headings.len());

    for (idx, (_, block_start, number)) in headings.iter().enumerate() {
        let block_end = headings
            .get(idx + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(body.len());
        let block = body[*block_start..block_end].trim();

        if block.chars().count() < MIN_BLOCK_CHARS {
            debug!(number = %number, "Skipping short block");
            continue;
        }

        let Ok(property_number) = number.parse::<u32>() else {
            continue;
        };

        let fields = extract_fields(block);
        properties.push(Property::new(
            sale_date,
            property_number,
            block,
            fields.size_m2,
            fields.reserve_type,
            fields.reserve_price,
            source_url,
        ));
    }

    properties
}

/// Narrow the document to the listing table when its header/footer are present
fn listing_section(text: &str) -> &str {
    let body = match SECTION_START_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    match SECTION_END_RE.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    }
}
