//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

// Import workflow types
use crate::delivery::{DeliveryOrchestrator, FormatSelection};
use crate::dialogue::DownloadDialogue;

/// Handle callback queries from the format keyboard
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: DownloadDialogue,
    orchestrator: Arc<DeliveryOrchestrator>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    let selection = FormatSelection {
        callback_id: q.id.clone(),
        message_id: q.message.as_ref().map(|message| message.id()),
        data: q.data.clone().unwrap_or_default(),
    };

    let outcome = orchestrator
        .handle_format_choice(&bot, &dialogue, selection, q.from.language_code.as_deref())
        .await?;
    debug!(user_id = %q.from.id, outcome = ?outcome, "Format choice handled");

    Ok(())
}
