use crate::models::{group_thousands, Property};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

/// Size and reserve lines, which the message repeats in its own format
static CLEANUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:\d[\d \t]*m²|No\s+Court\s+Reserve|Bank\s+Reserve|R[\d \t,]+Court\s+Reserve.*)[ \t]*$",
    )
    .expect("cleanup pattern must compile")
});

static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern must compile"));

/// Longest listing body included in a message, in characters
pub const MAX_BODY_CHARS: usize = 600;

/// Render a property as a Markdown chat message
pub fn format_property_message(property: &Property, source_page_url: &str) -> String {
    let date = property.sale_date;
    let date_str = format!("{} {} {}", date.day(), date.format("%b"), date.year());

    let cleaned = CLEANUP_RE.replace_all(&property.raw_text, "");
    let body = BLANK_RUN_RE.replace_all(cleaned.trim(), "\n\n");
    let body = truncate_chars(&body, MAX_BODY_CHARS);

    let size_line = match property.size_m2 {
        Some(size) if size > 0.0 => format!("📐 {}m²\n", group_thousands(size)),
        _ => String::new(),
    };

    let link_line = if property.source_url.is_empty() {
        format!("🔗 [Sheroot]({})", source_page_url)
    } else {
        format!("🔗 [Full property list]({})", property.source_url)
    };

    format!(
        "🏠 *Sale in Execution - {}*\n{}\n{}{}\n{}",
        date_str,
        body,
        size_line,
        property.reserve_display(),
        link_line
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
