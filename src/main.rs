use anyhow::{Context, Result};
use horocast::{
    RunOutcome,
    config::Config,
    messaging::TelegramClient,
    run,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env().context("loading configuration")?;
    info!(source = %config.source_url(), kind = ?config.source_kind(), "starting run");

    let messenger = TelegramClient::new(
        config.telegram_api_base(),
        config.telegram_token(),
        config.chat_id(),
    )
    .context("building telegram client")?;

    match run(&config, &messenger).await? {
        RunOutcome::Published { messages, .. } => info!(messages, "done"),
        RunOutcome::SkippedDuplicate { .. } => info!("nothing new to post"),
    }

    Ok(())
}
