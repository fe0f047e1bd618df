//! Message and callback handlers for the slot bot

use anyhow::Result;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{FileId, ParseMode};
use teloxide::utils::html::escape;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use super::catalog::{create_catalog_keyboard, page_count, parse_catalog_callback, CatalogAction, GAMES};
use super::predictor::{predict_bonus, BonusPrediction};
use super::{SlotDialogue, SlotDialogueState};
use crate::bot::gateway::ChatGateway;
use crate::localization::{t_args_lang, t_lang};

/// Download a Telegram file into a temp file that is removed on drop
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<NamedTempFile> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    let mut temp_file = NamedTempFile::new()?;
    temp_file.as_file_mut().write_all(&bytes)?;
    Ok(temp_file)
}

/// Check the file header for a PNG, JPEG or WebP signature
pub fn is_supported_image_format(file_path: &Path) -> bool {
    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %file_path.display(), error = %e, "Could not open image for format detection");
            return false;
        }
    };

    let mut buffer = Vec::with_capacity(32);
    if let Err(e) = BufReader::new(file).take(32).read_to_end(&mut buffer) {
        debug!(path = %file_path.display(), error = %e, "Could not read image header");
        return false;
    }
    if buffer.len() < 8 {
        debug!(path = %file_path.display(), bytes_read = buffer.len(), "Image too short for format detection");
        return false;
    }

    match image::guess_format(&buffer) {
        Ok(format) => {
            let supported = matches!(
                format,
                image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::WebP
            );
            debug!(format = ?format, supported, "Detected image format");
            supported
        }
        Err(e) => {
            debug!(error = %e, "Could not determine image format");
            false
        }
    }
}

/// Text of the catalog message for a page
pub fn catalog_text(page: usize, language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}",
        t_lang("slots-welcome", language_code),
        t_args_lang(
            "slots-page",
            &[
                ("page", &(page + 1).to_string()),
                ("total", &page_count().to_string()),
            ],
            language_code,
        )
    )
}

/// Reply text for a prediction
pub fn prediction_text(game: &str, prediction: BonusPrediction, language_code: Option<&str>) -> String {
    t_args_lang(
        "slots-prediction",
        &[
            ("game", &escape(game)),
            ("spins", &prediction.spins_until_bonus.to_string()),
            ("confidence", &prediction.confidence_percent.to_string()),
        ],
        language_code,
    )
}

/// Reset the game choice and send the first catalog page
pub async fn show_catalog(
    gateway: &dyn ChatGateway,
    dialogue: &SlotDialogue,
    language_code: Option<&str>,
) -> Result<()> {
    let chat_id = dialogue.chat_id();
    info!(user_id = %chat_id, "Slot catalog requested");
    // Chats seen for the first time have no stored state to remove
    dialogue.update(SlotDialogueState::Menu).await?;
    gateway
        .send_text(
            chat_id,
            catalog_text(0, language_code),
            Some(create_catalog_keyboard(0, language_code)),
        )
        .await?;
    Ok(())
}

fn image_file_id(msg: &Message) -> Option<FileId> {
    if let Some(photos) = msg.photo() {
        // Sizes are ascending, the last one is the original
        return photos.last().map(|photo| photo.file.id.clone());
    }
    msg.document().map(|document| document.file.id.clone())
}

/// Handle an incoming message for the slot bot
pub async fn slot_message_handler(bot: Bot, msg: Message, dialogue: SlotDialogue) -> Result<()> {
    let language_code = msg.from.as_ref().and_then(|user| user.language_code.clone());
    let language_code = language_code.as_deref();
    let chat_id = msg.chat.id;

    if let Some(text) = msg.text() {
        let command = text.split_whitespace().next().unwrap_or("");
        match command.split('@').next().unwrap_or(command) {
            "/start" => {
                show_catalog(&bot, &dialogue, language_code).await?;
            }
            "/help" => {
                bot.send_text(chat_id, t_lang("slots-help", language_code), None)
                    .await?;
            }
            _ => {
                bot.send_text(chat_id, t_lang("slots-send-image", language_code), None)
                    .await?;
            }
        }
        return Ok(());
    }

    let Some(file_id) = image_file_id(&msg) else {
        bot.send_text(chat_id, t_lang("slots-send-image", language_code), None)
            .await?;
        return Ok(());
    };

    let state = dialogue.get().await?.unwrap_or_default();
    let Some(game) = state.selected_game().map(str::to_string) else {
        debug!(user_id = %chat_id, "Screenshot received before a game was picked");
        bot.send_text(chat_id, t_lang("slots-no-game", language_code), None)
            .await?;
        return Ok(());
    };

    bot.send_text(chat_id, t_lang("slots-analyzing", language_code), None)
        .await?;

    let temp_file = match download_file(&bot, file_id).await {
        Ok(file) => file,
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Failed to download screenshot");
            bot.send_text(chat_id, t_lang("slots-download-failed", language_code), None)
                .await?;
            return Ok(());
        }
    };

    if !is_supported_image_format(temp_file.path()) {
        warn!(user_id = %chat_id, "Unsupported image format rejected");
        bot.send_text(chat_id, t_lang("slots-unsupported-image", language_code), None)
            .await?;
        return Ok(());
    }

    let prediction = predict_bonus(&mut rand::thread_rng());
    info!(
        user_id = %chat_id,
        game = %game,
        spins = prediction.spins_until_bonus,
        confidence = prediction.confidence_percent,
        "Prediction sent"
    );
    bot.send_message(chat_id, prediction_text(&game, prediction, language_code))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle catalog keyboard presses
pub async fn slot_callback_handler(bot: Bot, q: CallbackQuery, dialogue: SlotDialogue) -> Result<()> {
    let language_code = q.from.language_code.as_deref();
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id = %q.from.id, data = %data, "Received slot callback");

    if let Err(e) = bot.answer_callback(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let Some(message) = &q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    match parse_catalog_callback(data) {
        Some(CatalogAction::Page(page)) => {
            bot.edit_text(
                chat_id,
                message.id(),
                catalog_text(page, language_code),
                Some(create_catalog_keyboard(page, language_code)),
            )
            .await?;
        }
        Some(CatalogAction::Game(index)) => {
            let game = GAMES[index].to_string();
            info!(user_id = %q.from.id, game = %game, "Game selected");
            bot.send_text(
                chat_id,
                t_args_lang("slots-game-selected", &[("game", &escape(&game))], language_code),
                None,
            )
            .await?;
            dialogue
                .update(SlotDialogueState::AwaitingScreenshot { game })
                .await?;
        }
        None => {
            debug!(user_id = %q.from.id, data = %data, "Ignoring unknown slot callback");
        }
    }

    Ok(())
}
