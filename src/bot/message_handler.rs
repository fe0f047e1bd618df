//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

// Import localization
use crate::localization::t_lang;

// Import workflow types
use crate::delivery::DeliveryOrchestrator;
use crate::dialogue::DownloadDialogue;

/// Handle an incoming message for the download bot
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: DownloadDialogue,
    orchestrator: Arc<DeliveryOrchestrator>,
) -> Result<()> {
    let language_code = msg.from.as_ref().and_then(|user| user.language_code.clone());
    let language_code = language_code.as_deref();

    debug!(
        user_id = %msg.chat.id,
        language_code = ?language_code,
        "Received message"
    );

    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Ignoring non-text message");
        bot.send_message(msg.chat.id, t_lang("not-a-link", language_code))
            .parse_mode(teloxide::types::ParseMode::Html)
            .await?;
        return Ok(());
    };

    let command = text.split_whitespace().next().unwrap_or("");
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "/start" => {
            orchestrator
                .handle_start(&bot, &dialogue, language_code)
                .await?;
        }
        "/help" => {
            orchestrator
                .handle_help(&bot, msg.chat.id, language_code)
                .await?;
        }
        _ => {
            let outcome = orchestrator
                .handle_link(&bot, &dialogue, text, language_code)
                .await?;
            debug!(user_id = %msg.chat.id, outcome = ?outcome, "Link handled");
        }
    }

    Ok(())
}
