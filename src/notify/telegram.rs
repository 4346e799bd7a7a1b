use crate::config::Config;
use crate::error::DispatchError;
use crate::models::{Property, Subscriber};
use crate::notify::{format_property_message, NotificationSink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Delivers notifications through the Telegram Bot API
pub struct TelegramSink {
    client: Client,
    send_url: String,
    source_page_url: String,
}

impl TelegramSink {
    pub fn new(token: &str, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", API_BASE, token),
            source_page_url: config.source_page_url.clone(),
        })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, subscriber: &Subscriber, property: &Property) -> Result<(), DispatchError> {
        if subscriber.chat_id == 0 {
            return Err(DispatchError::NoAddress(subscriber.id));
        }

        let text = format_property_message(property, &self.source_page_url);
        let body = SendMessage {
            chat_id: subscriber.chat_id,
            text: &text,
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };

        // The URL carries the bot token, keep it out of error messages
        let response = self
            .client
            .post(&self.send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Failed to send notification to chat_id={}: {}",
                subscriber.chat_id, status
            );
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            "Notification sent to chat_id={} for property #{} on {}",
            subscriber.chat_id, property.property_number, property.sale_date
        );
        Ok(())
    }
}
