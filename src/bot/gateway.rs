//! Chat gateway: the four messaging operations the delivery workflow needs

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};

/// Kind of attachment relayed to the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutgoingFileKind {
    Video,
    Audio,
}

/// A local file sent to the chat with an HTML caption
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingFile {
    pub kind: OutgoingFileKind,
    pub path: PathBuf,
    pub caption: String,
    pub title: Option<String>,
}

/// Outbound side of the messaging platform
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send an HTML text message, optionally with an inline keyboard
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId>;

    /// Replace the text (and keyboard) of a previously sent message
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Upload a local file with a caption
    async fn send_file(&self, chat_id: ChatId, file: OutgoingFile) -> Result<()>;

    /// Acknowledge a button press so the client stops its spinner
    async fn answer_callback(&self, callback_id: CallbackQueryId) -> Result<()>;
}

#[async_trait]
impl ChatGateway for Bot {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId> {
        let request = self.send_message(chat_id, text).parse_mode(ParseMode::Html);
        let sent = match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(sent.id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let request = self
            .edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::Html);
        match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_file(&self, chat_id: ChatId, file: OutgoingFile) -> Result<()> {
        let input = InputFile::file(file.path);
        match file.kind {
            OutgoingFileKind::Video => {
                self.send_video(chat_id, input)
                    .caption(file.caption)
                    .parse_mode(ParseMode::Html)
                    .supports_streaming(true)
                    .await?;
            }
            OutgoingFileKind::Audio => {
                let request = self
                    .send_audio(chat_id, input)
                    .caption(file.caption)
                    .parse_mode(ParseMode::Html);
                match file.title {
                    Some(title) => request.title(title).await?,
                    None => request.await?,
                };
            }
        }
        Ok(())
    }

    async fn answer_callback(&self, callback_id: CallbackQueryId) -> Result<()> {
        self.answer_callback_query(callback_id).await?;
        Ok(())
    }
}
