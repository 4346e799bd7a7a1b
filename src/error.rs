use thiserror::Error;

/// Retrieving a calendar or document failed. The date is skipped this run and
/// retried on the next one.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected calendar payload: {0}")]
    Calendar(String),

    #[error("Could not extract text from {url}: {reason}")]
    Extraction { url: String, reason: String },
}

/// Delivering one notification to one subscriber failed
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Subscriber {0} has no delivery address")]
    NoAddress(i64),
}
