use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Text of a published sale document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub text: String,
    pub url: String,
}

/// Result of asking a source for one date's document
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Published(SourceDocument),
    /// The date is on the calendar but its list has not been posted yet
    NotYetPublished,
}

/// Top level of the calendar widget payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarPayload {
    #[serde(default)]
    pub project: CalendarProject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarProject {
    #[serde(default)]
    pub data: CalendarData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarData {
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

/// One sale day on the calendar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`, preferred when present
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    /// Epoch milliseconds, used when `startDate` is missing
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub links: Vec<CalendarLink>,
}

/// Links may arrive as bare strings or as `{ "url": .. }` objects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CalendarLink {
    Url(String),
    Object {
        #[serde(alias = "href", alias = "link")]
        url: String,
    },
}

impl CalendarLink {
    pub fn url(&self) -> &str {
        match self {
            CalendarLink::Url(url) => url,
            CalendarLink::Object { url } => url,
        }
    }
}

impl CalendarEvent {
    /// Sale date of the event, if it can be read
    pub fn sale_date(&self) -> Option<NaiveDate> {
        if let Some(date) = self
            .start_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        {
            return Some(date);
        }
        self.start
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_date_from_start_date() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"a","title":"Roodepoort","startDate":"2025-11-14","links":["Listfixed1"]}"#,
        )
        .unwrap();
        assert_eq!(event.sale_date(), NaiveDate::from_ymd_opt(2025, 11, 14));
        assert_eq!(event.links[0].url(), "Listfixed1");
    }

    #[test]
    fn test_event_date_from_millis() {
        let event: CalendarEvent =
            serde_json::from_str(r#"{"title":"x","start":1763078400000,"links":[{"url":"a.html"}]}"#)
                .unwrap();
        assert_eq!(event.sale_date(), NaiveDate::from_ymd_opt(2025, 11, 14));
        assert_eq!(event.links[0].url(), "a.html");
    }

    #[test]
    fn test_payload_tolerates_missing_sections() {
        let payload: CalendarPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.project.data.events.is_empty());
    }
}
