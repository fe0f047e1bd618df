use anyhow::{Context, Result};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;

use tubedrop::localization::init_localization;
use tubedrop::slots::{slot_callback_handler, slot_message_handler, SlotDialogueState};
use tubedrop::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting slot analysis bot");

    let token = std::env::var("SLOT_BOT_TOKEN")
        .or_else(|_| std::env::var("TELEGRAM_BOT_TOKEN"))
        .context("SLOT_BOT_TOKEN or TELEGRAM_BOT_TOKEN must be set")?;
    init_localization()?;

    let bot = Bot::new(token);

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .enter_dialogue::<Message, InMemStorage<SlotDialogueState>, SlotDialogueState>()
                .endpoint(slot_message_handler),
        )
        .branch(
            Update::filter_callback_query()
                .enter_dialogue::<CallbackQuery, InMemStorage<SlotDialogueState>, SlotDialogueState>()
                .endpoint(slot_callback_handler),
        );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<SlotDialogueState>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
