//! MoraTalk binary: wires config, question bank, level store and channels together.

use std::sync::Arc;

use moratalk::bot::Dispatcher;
use moratalk::channels::{Channel, ChannelManager, CliChannel, TelegramChannel};
use moratalk::config::BotConfig;
use moratalk::placement::{PlacementEngine, QuestionBank};
use moratalk::store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("📚 MoraTalk v{}", env!("CARGO_PKG_VERSION"));

    let bank = match &config.question_bank_path {
        Some(path) => {
            let bank = QuestionBank::load(path).await?;
            eprintln!("   Question bank: {}", path.display());
            bank
        }
        None => {
            eprintln!("   Question bank: built-in");
            QuestionBank::builtin()
        }
    };

    let store = JsonFileStore::new(config.data_path.clone());
    eprintln!("   Level store: {}", store.path().display());

    let engine = Arc::new(PlacementEngine::new(Arc::new(bank), Arc::new(store)));

    let mut channels = ChannelManager::new();
    if config.cli_enabled {
        channels.add(Box::new(CliChannel::new()));
    }

    if let Some(telegram) = &config.telegram {
        eprintln!(
            "   Telegram: enabled (allowed: {})",
            if telegram.allowed_users.iter().any(|u| u == "*") {
                "everyone".to_string()
            } else {
                telegram.allowed_users.join(", ")
            }
        );

        let channel = TelegramChannel::from_config(telegram);
        if let Err(e) = channel.health_check().await {
            tracing::warn!("Telegram health check failed: {e}");
        }
        channels.add(Box::new(channel));
    }

    eprintln!("   Channels: {}\n", channels.names().join(", "));

    Dispatcher::new(engine, channels).run().await?;

    Ok(())
}
