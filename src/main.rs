use auction_scout::notify::{LogSink, NotificationSink, TelegramSink};
use auction_scout::scrapers::SherootSource;
use auction_scout::storage::JsonFileStore;
use auction_scout::{Config, Pipeline, RunOutcome};
use chrono::Local;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("auction_scout=info")),
        )
        .init();

    info!("🏠 Auction Scout - Sale in Execution Monitor");
    info!("=============================================");

    let config = Config::from_env()?;

    let source = SherootSource::new(&config)?;
    let store = JsonFileStore::open(&config.database_path).await?;
    let sink: Arc<dyn NotificationSink> = match &config.telegram_bot_token {
        Some(token) => Arc::new(TelegramSink::new(token, &config)?),
        None => {
            info!("TELEGRAM_BOT_TOKEN not set, printing notifications instead");
            Arc::new(LogSink::new(config.source_page_url.clone()))
        }
    };

    let pipeline = Pipeline::new(Arc::new(source), Arc::new(store), sink);

    let today = Local::now().date_naive();
    match pipeline.run_once(today).await? {
        RunOutcome::Completed(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        RunOutcome::Skipped => info!("Another run holds the store, nothing done"),
    }

    Ok(())
}
