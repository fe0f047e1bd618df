//! Test doubles shared by the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use teloxide::types::{CallbackQueryId, ChatId, InlineKeyboardMarkup, MessageId};

use tubedrop::bot::gateway::{ChatGateway, OutgoingFile};
use tubedrop::extractor::{DownloadOptions, MediaExtractor, RawFormat, RawMediaInfo};
use tubedrop::media_errors::MediaError;

pub const MIB: u64 = 1024 * 1024;

/// Extractor that serves canned metadata and writes a file of a fixed size
pub struct MockExtractor {
    pub info: Result<RawMediaInfo, MediaError>,
    /// Size of the file written on download; `None` writes nothing
    pub artifact_size: Option<u64>,
    /// Whether the produced path is reported back, like `--print after_move:filepath`
    pub report_path: bool,
    pub downloads: Mutex<Vec<DownloadOptions>>,
}

impl MockExtractor {
    pub fn new(info: RawMediaInfo, artifact_size: u64) -> Self {
        Self {
            info: Ok(info),
            artifact_size: Some(artifact_size),
            report_path: true,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_probe(message: &str) -> Self {
        Self {
            info: Err(MediaError::Probe(message.to_string())),
            artifact_size: None,
            report_path: true,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_downloads(&self) -> Vec<DownloadOptions> {
        self.downloads.lock().unwrap().clone()
    }
}

impl MediaExtractor for MockExtractor {
    fn extract_info(&self, _url: &str) -> Result<RawMediaInfo, MediaError> {
        self.info.clone()
    }

    fn download(&self, _url: &str, options: &DownloadOptions) -> Result<Option<PathBuf>, MediaError> {
        self.downloads.lock().unwrap().push(options.clone());

        let Some(size) = self.artifact_size else {
            return Ok(None);
        };

        let dir = options
            .output_template
            .parent()
            .ok_or_else(|| MediaError::Acquisition("template without directory".to_string()))?;
        let ext = if options.audio.is_some() { "mp3" } else { "mp4" };
        let path = dir.join(format!("Test Clip.{ext}"));
        fs::write(&path, vec![0u8; size as usize])?;

        Ok(self.report_path.then_some(path))
    }
}

/// Info document with three video tiers and an audio-only variant
pub fn sample_info(total_size: u64) -> RawMediaInfo {
    let video = |height: u32, size: u64| RawFormat {
        format_id: Some(format!("{height}")),
        ext: Some("mp4".to_string()),
        height: Some(height),
        vcodec: Some("avc1".to_string()),
        acodec: Some("mp4a".to_string()),
        filesize: Some(size),
        filesize_approx: None,
    };

    RawMediaInfo {
        id: Some("dQw4w9WgXcQ".to_string()),
        title: Some("Test Clip".to_string()),
        duration: Some(212.0),
        uploader: Some("Test Channel".to_string()),
        filesize: Some(total_size),
        filesize_approx: None,
        formats: vec![
            RawFormat {
                format_id: Some("140".to_string()),
                ext: Some("m4a".to_string()),
                height: None,
                vcodec: Some("none".to_string()),
                acodec: Some("mp4a".to_string()),
                filesize: Some(3 * MIB),
                filesize_approx: None,
            },
            video(360, 8 * MIB),
            video(720, 20 * MIB),
            video(1080, 45 * MIB),
        ],
    }
}

/// One outbound call made through the gateway
#[derive(Debug, Clone)]
pub enum GatewayCall {
    SendText {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    EditText {
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    SendFile(OutgoingFile),
    AnswerCallback(CallbackQueryId),
}

/// Gateway that records every call instead of talking to Telegram
#[derive(Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<GatewayCall>>,
    /// Error text returned by `send_file`, if set
    pub send_file_error: Option<String>,
    /// Whether the uploaded file existed at upload time
    pub file_existed: Mutex<Vec<bool>>,
}

impl RecordingGateway {
    pub fn failing_uploads(error: &str) -> Self {
        Self {
            send_file_error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of every sent or edited message, in order
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendText { text, .. } | GatewayCall::EditText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn sent_files(&self) -> Vec<OutgoingFile> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::SendFile(file) => Some(file),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_text(
        &self,
        _chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(GatewayCall::SendText { text, keyboard });
        Ok(MessageId(calls.len() as i32))
    }

    async fn edit_text(
        &self,
        _chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(GatewayCall::EditText {
            message_id,
            text,
            keyboard,
        });
        Ok(())
    }

    async fn send_file(&self, _chat_id: ChatId, file: OutgoingFile) -> Result<()> {
        self.file_existed.lock().unwrap().push(file.path.is_file());
        self.calls.lock().unwrap().push(GatewayCall::SendFile(file));
        match &self.send_file_error {
            Some(error) => Err(anyhow!("{error}")),
            None => Ok(()),
        }
    }

    async fn answer_callback(&self, callback_id: CallbackQueryId) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::AnswerCallback(callback_id));
        Ok(())
    }
}
