//! Delivery of matched listings to subscribers.

pub mod message;
pub mod telegram;

pub use message::format_property_message;
pub use telegram::TelegramSink;

use crate::error::DispatchError;
use crate::models::{Property, Subscriber};
use async_trait::async_trait;
use tracing::info;

/// Where notifications go. A failed send is reported, never fatal to the run.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, subscriber: &Subscriber, property: &Property) -> Result<(), DispatchError>;
}

/// Prints messages to stdout instead of delivering them
pub struct LogSink {
    source_page_url: String,
}

impl LogSink {
    pub fn new(source_page_url: impl Into<String>) -> Self {
        Self {
            source_page_url: source_page_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, subscriber: &Subscriber, property: &Property) -> Result<(), DispatchError> {
        info!(
            subscriber = subscriber.id,
            "Would notify chat {} about property #{} on {}",
            subscriber.chat_id,
            property.property_number,
            property.sale_date
        );
        println!("{}", format_property_message(property, &self.source_page_url));
        println!();
        Ok(())
    }
}
