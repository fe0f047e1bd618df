use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};

use tubedrop::bot::{callback_handler, message_handler};
use tubedrop::config::BotConfig;
use tubedrop::delivery::DeliveryOrchestrator;
use tubedrop::dialogue::DownloadDialogueState;
use tubedrop::extractor::{MediaExtractor, YtDlpExtractor};
use tubedrop::localization::init_localization;
use tubedrop::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting YouTube download bot");

    let config = BotConfig::from_env()?;
    init_localization()?;

    let ytdlp = YtDlpExtractor::from_config(&config.acquisition);
    if !ytdlp.check_availability() {
        warn!(
            binary = %config.acquisition.ytdlp_path,
            "yt-dlp is not available, every download will fail until it is installed"
        );
    }
    let extractor: Arc<dyn MediaExtractor> = Arc::new(ytdlp);
    let orchestrator = Arc::new(DeliveryOrchestrator::from_config(extractor, &config));

    info!(
        scratch_dir = %config.acquisition.scratch_dir.display(),
        max_file_size = config.acquisition.max_file_size,
        session_ttl_secs = config.session_ttl_secs,
        "Configuration loaded"
    );

    let bot = Bot::new(config.token.clone());

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<DownloadDialogueState>, DownloadDialogueState>()
                .endpoint(message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<DownloadDialogueState>, DownloadDialogueState>()
                .endpoint(callback_handler),
        );

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            InMemStorage::<DownloadDialogueState>::new(),
            orchestrator
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
