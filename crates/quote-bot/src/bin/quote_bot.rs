use std::fs;

use quote_bot::{console, QuoteBot, QuoteBotConfig};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = QuoteBotConfig::from_env()?;
    if let Some(dir) = config.database_dir() {
        fs::create_dir_all(&dir)?;
    }
    info!(
        "Starting quote-bot {} (database: {}, bot: {:?})",
        quote_bot::version(),
        config.sqlite_url,
        config.bot_username
    );

    let bot = QuoteBot::connect(config).await?;

    let summary = console::serve(
        bot.clone(),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    info!(
        "Input closed after {} events ({} skipped, {} replies), shutting down",
        summary.events, summary.skipped, summary.replies
    );
    bot.db().close().await;
    Ok(())
}
