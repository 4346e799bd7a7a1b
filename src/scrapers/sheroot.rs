use crate::config::Config;
use crate::error::FetchError;
use crate::scrapers::traits::DocumentSource;
use crate::scrapers::types::{CalendarPayload, FetchOutcome, SourceDocument};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Sheriff sale calendar scraper.
///
/// Reads the calendar widget's JSON feed for sale dates and follows each
/// date's list page to the published document.
pub struct SherootSource {
    client: Client,
    calendar_data_url: String,
    base_url: String,
    /// Links per sale date, filled by `list_open_dates`
    links: Mutex<HashMap<NaiveDate, Vec<String>>>,
}

impl SherootSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            calendar_data_url: config.calendar_data_url.clone(),
            base_url: config.source_base_url.trim_end_matches('/').to_string(),
            links: Mutex::new(HashMap::new()),
        })
    }

    /// Make a calendar link absolute
    fn resolve_url(&self, url: &str) -> String {
        resolve_url(&self.base_url, url)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!("Fetching URL: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    /// Fetch a list page; a readable linked PDF wins over the page's own text
    async fn fetch_list_page(&self, url: &str) -> Result<Option<SourceDocument>, FetchError> {
        let html = match self.get(url).await {
            Ok(response) => response.text().await?,
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                info!("List page {} not up yet", url);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let (pdf_href, page_text) = inspect_page(&html);

        let pdf = match pdf_href {
            Some(href) => {
                let pdf_url = self.resolve_url(&href);
                info!("Found PDF link on list page: {}", pdf_url);
                let text = self.fetch_pdf_text(&pdf_url).await;
                Some((pdf_url, text))
            }
            None => None,
        };

        Ok(choose_document(pdf, page_text, url))
    }

    async fn fetch_pdf_text(&self, pdf_url: &str) -> Result<String, FetchError> {
        let bytes = self.get(pdf_url).await?.bytes().await?;
        info!("Downloaded PDF: {} bytes", bytes.len());
        extract_pdf_text(pdf_url, bytes.to_vec()).await
    }
}

#[async_trait]
impl DocumentSource for SherootSource {
    async fn list_open_dates(&self) -> Result<Vec<NaiveDate>, FetchError> {
        info!("Loading sale calendar from {}", self.calendar_data_url);

        let payload: CalendarPayload = self
            .get(&self.calendar_data_url)
            .await?
            .json()
            .await
            .map_err(|e| FetchError::Calendar(e.to_string()))?;

        let events = payload.project.data.events;
        info!("Events found in calendar: {}", events.len());

        let mut dates = Vec::new();
        let mut links: HashMap<NaiveDate, Vec<String>> = HashMap::new();

        for event in &events {
            let Some(date) = event.sale_date() else {
                warn!("Skipping event '{}' without a readable date", event.title);
                continue;
            };
            if !links.contains_key(&date) {
                dates.push(date);
            }
            links
                .entry(date)
                .or_default()
                .extend(event.links.iter().map(|l| self.resolve_url(l.url())));
        }

        *self.links.lock().unwrap_or_else(|e| e.into_inner()) = links;
        Ok(dates)
    }

    async fn fetch_document(&self, date: NaiveDate) -> Result<FetchOutcome, FetchError> {
        let links = self
            .links
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&date)
            .cloned()
            .unwrap_or_default();

        if links.is_empty() {
            debug!(%date, "No list links on calendar yet");
            return Ok(FetchOutcome::NotYetPublished);
        }

        first_published(date, &links, move |link| async move {
            self.fetch_list_page(&link).await
        })
        .await
    }

    fn source_name(&self) -> &'static str {
        "Sheroot"
    }
}

/// Try each list link in turn until one yields a document.
///
/// A failing link is logged and skipped. Its error is returned only when every
/// link failed; if any link answered without a document the date is unpublished.
async fn first_published<F, Fut>(
    date: NaiveDate,
    links: &[String],
    mut fetch: F,
) -> Result<FetchOutcome, FetchError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<SourceDocument>, FetchError>>,
{
    let mut last_err = None;
    let mut answered = false;

    for link in links {
        match fetch(link.clone()).await {
            Ok(Some(document)) => {
                info!(%date, url = %document.url, chars = document.text.len(), "Fetched sale document");
                return Ok(FetchOutcome::Published(document));
            }
            Ok(None) => answered = true,
            Err(e) => {
                warn!(%date, url = %link, error = %e, "List link failed, trying the next one");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if !answered => Err(e),
        _ => Ok(FetchOutcome::NotYetPublished),
    }
}

/// Prefer the PDF's text, falling back to the page body when the PDF is unusable
fn choose_document(
    pdf: Option<(String, Result<String, FetchError>)>,
    page_text: String,
    page_url: &str,
) -> Option<SourceDocument> {
    if let Some((pdf_url, result)) = pdf {
        match result {
            Ok(text) if !text.trim().is_empty() => {
                return Some(SourceDocument { text, url: pdf_url });
            }
            Ok(_) => warn!("PDF {} produced no text, falling back to page body", pdf_url),
            Err(e) => warn!(error = %e, "PDF {} unusable, falling back to page body", pdf_url),
        }
    }

    if page_text.trim().is_empty() {
        return None;
    }
    Some(SourceDocument {
        text: page_text,
        url: page_url.to_string(),
    })
}

/// Resolve a link the way the calendar writes them: absolute, `www.` or site-relative
pub fn resolve_url(base: &str, url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with("www.") {
        format!("https://{}", url)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
    }
}

/// Find a PDF link and the visible body text of a list page
fn inspect_page(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").expect("static selector");
    let body_selector = Selector::parse("body").expect("static selector");

    let pdf_href = document
        .select(&link_selector)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.to_ascii_lowercase().ends_with(".pdf"))
        .map(str::to_string);

    let text = document
        .select(&body_selector)
        .next()
        .map(|body| {
            body.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    (pdf_href, text)
}

async fn extract_pdf_text(url: &str, bytes: Vec<u8>) -> Result<String, FetchError> {
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| FetchError::Extraction {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    result.map_err(|reason| FetchError::Extraction {
        url: url.to_string(),
        reason,
    })
}
