//! # Delivery Orchestrator Module
//!
//! Drives one chat through the download workflow:
//!
//! - **Idle** → a supported link arrives, metadata is probed, the format
//!   keyboard is shown (**AwaitingFormatChoice**)
//! - **AwaitingFormatChoice** → the user picks a format, an ETA is reported and
//!   the transfer starts (**Downloading**)
//! - **Downloading** → the file is relayed and deleted (**Delivered**), or the
//!   failure is explained (**Failed**); either way the chat returns to **Idle**
//!
//! Probing and transfers block, so they run on the blocking thread pool while
//! the chat's task waits for them.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use teloxide::types::{CallbackQueryId, ChatId, MessageId};
use teloxide::utils::html::escape;
use tracing::{debug, error, info, warn};

use crate::acquisition::{discard_artifact, AcquisitionEngine};
use crate::bot::gateway::{ChatGateway, OutgoingFile, OutgoingFileKind};
use crate::bot::ui_builder::{create_format_keyboard, format_caption, format_metadata_summary, quality_display};
use crate::config::BotConfig;
use crate::dialogue::{DownloadDialogue, DownloadDialogueState, PendingLookup};
use crate::estimator::{audio_size_bytes, estimate_seconds, format_duration};
use crate::extractor::MediaExtractor;
use crate::link_classifier::is_supported_url;
use crate::localization::{t_args_lang, t_lang};
use crate::media_errors::MediaError;
use crate::media_model::{DownloadResult, FormatChoice, MediaRequest};
use crate::prober::MetadataProber;

/// How a single interaction ended
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// The text was not a supported link
    NotALink,
    /// The link could not be probed
    ProbeFailed(MediaError),
    /// Format keyboard shown, waiting for the user
    AwaitingChoice,
    /// A choice arrived without a stored link
    LinkNotFound,
    /// A choice arrived while a transfer was running
    Busy,
    /// Callback data did not decode to a format choice
    UnknownChoice,
    Delivered(DownloadResult),
    Failed(MediaError),
}

/// A button press on the format keyboard
#[derive(Debug, Clone)]
pub struct FormatSelection {
    pub callback_id: CallbackQueryId,
    /// Message carrying the keyboard, if still accessible
    pub message_id: Option<MessageId>,
    pub data: String,
}

pub struct DeliveryOrchestrator {
    prober: Arc<MetadataProber>,
    engine: Arc<AcquisitionEngine>,
    assumed_mbps: f64,
    session_ttl: Duration,
}

impl DeliveryOrchestrator {
    pub fn new(
        prober: Arc<MetadataProber>,
        engine: Arc<AcquisitionEngine>,
        assumed_mbps: f64,
        session_ttl: Duration,
    ) -> Self {
        Self {
            prober,
            engine,
            assumed_mbps,
            session_ttl,
        }
    }

    /// Wire prober and engine around one extractor
    pub fn from_config(extractor: Arc<dyn MediaExtractor>, config: &BotConfig) -> Self {
        Self::new(
            Arc::new(MetadataProber::new(Arc::clone(&extractor))),
            Arc::new(AcquisitionEngine::new(extractor, config.acquisition.clone())),
            config.assumed_mbps,
            Duration::seconds(config.session_ttl_secs),
        )
    }

    /// Upload cap in whole MiB, as shown to users
    pub fn max_file_size_mib(&self) -> u64 {
        self.engine.config().max_file_size_mib()
    }

    fn limit_mib(&self) -> String {
        self.max_file_size_mib().to_string()
    }

    /// Greet the user and drop any pending link
    pub async fn handle_start(
        &self,
        gateway: &dyn ChatGateway,
        dialogue: &DownloadDialogue,
        language_code: Option<&str>,
    ) -> Result<()> {
        let chat_id = dialogue.chat_id();
        info!(chat_id = %chat_id, "Start command received");
        // Chats seen for the first time have no stored state to remove
        dialogue.update(DownloadDialogueState::Idle).await?;
        gateway
            .send_text(chat_id, t_lang("welcome-message", language_code), None)
            .await?;
        Ok(())
    }

    pub async fn handle_help(
        &self,
        gateway: &dyn ChatGateway,
        chat_id: ChatId,
        language_code: Option<&str>,
    ) -> Result<()> {
        info!(chat_id = %chat_id, "Help command received");
        let message = t_args_lang("help-message", &[("limit", &self.limit_mib())], language_code);
        gateway.send_text(chat_id, message, None).await?;
        Ok(())
    }

    /// Handle a text message that may be a link
    pub async fn handle_link(
        &self,
        gateway: &dyn ChatGateway,
        dialogue: &DownloadDialogue,
        text: &str,
        language_code: Option<&str>,
    ) -> Result<DeliveryOutcome> {
        let chat_id = dialogue.chat_id();
        let url = text.trim();

        if !is_supported_url(url) {
            debug!(chat_id = %chat_id, "Text is not a supported link");
            gateway
                .send_text(chat_id, t_lang("not-a-link", language_code), None)
                .await?;
            return Ok(DeliveryOutcome::NotALink);
        }

        let status_id = gateway
            .send_text(chat_id, t_lang("probing", language_code), None)
            .await?;

        let prober = Arc::clone(&self.prober);
        let owned_url = url.to_string();
        let probed = tokio::task::spawn_blocking(move || prober.probe(&owned_url))
            .await
            .unwrap_or_else(|e| Err(MediaError::Probe(format!("probe task failed: {e}"))));

        match probed {
            Ok(metadata) => {
                let summary = format_metadata_summary(&metadata, language_code);
                let keyboard = create_format_keyboard(&metadata, language_code);
                gateway
                    .edit_text(chat_id, status_id, summary, Some(keyboard))
                    .await?;

                // A new link replaces whatever the chat had pending
                dialogue
                    .update(DownloadDialogueState::AwaitingFormatChoice {
                        source_url: url.to_string(),
                        metadata,
                        probed_at: Utc::now(),
                    })
                    .await?;

                info!(chat_id = %chat_id, url = %url, "Format keyboard sent");
                Ok(DeliveryOutcome::AwaitingChoice)
            }
            Err(e) => {
                warn!(chat_id = %chat_id, url = %url, error = %e, "Metadata probe failed");
                let message = t_args_lang(
                    "probe-failed",
                    &[("error", &escape(e.detail()))],
                    language_code,
                );
                gateway.edit_text(chat_id, status_id, message, None).await?;
                dialogue.update(DownloadDialogueState::Idle).await?;
                Ok(DeliveryOutcome::ProbeFailed(e))
            }
        }
    }

    /// Handle a button press on the format keyboard
    pub async fn handle_format_choice(
        &self,
        gateway: &dyn ChatGateway,
        dialogue: &DownloadDialogue,
        selection: FormatSelection,
        language_code: Option<&str>,
    ) -> Result<DeliveryOutcome> {
        let chat_id = dialogue.chat_id();

        if let Err(e) = gateway.answer_callback(selection.callback_id.clone()).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to answer callback query");
        }

        let Some(choice) = FormatChoice::from_callback_data(&selection.data) else {
            debug!(chat_id = %chat_id, data = %selection.data, "Ignoring unknown callback data");
            return Ok(DeliveryOutcome::UnknownChoice);
        };

        let state = dialogue.get().await?.unwrap_or_default();
        let link = match state.pending_link(Utc::now(), self.session_ttl) {
            PendingLookup::Ready(link) => link,
            PendingLookup::NotFound => {
                info!(chat_id = %chat_id, "Format chosen without a stored link");
                self.notify(gateway, chat_id, selection.message_id, t_lang("link-not-found", language_code))
                    .await?;
                dialogue.update(DownloadDialogueState::Idle).await?;
                return Ok(DeliveryOutcome::LinkNotFound);
            }
            PendingLookup::Busy => {
                gateway
                    .send_text(chat_id, t_lang("download-in-progress", language_code), None)
                    .await?;
                return Ok(DeliveryOutcome::Busy);
            }
        };

        let request = MediaRequest::new(link.source_url.clone(), choice);

        // ETA from the metadata captured at probe time
        let expected_size = match choice {
            FormatChoice::Audio => audio_size_bytes(
                link.metadata.duration_seconds,
                self.engine.config().audio_bitrate_kbps,
            ),
            FormatChoice::Video(selector) => link.metadata.expected_size(selector),
        };
        let eta = format_duration(estimate_seconds(expected_size, self.assumed_mbps));
        let progress = match choice {
            FormatChoice::Audio => t_args_lang("downloading-audio", &[("eta", &eta)], language_code),
            FormatChoice::Video(selector) => t_args_lang(
                "downloading-video",
                &[
                    ("quality", &quality_display(&selector.label(), language_code)),
                    ("eta", &eta),
                ],
                language_code,
            ),
        };
        self.notify(gateway, chat_id, selection.message_id, progress).await?;

        dialogue
            .update(DownloadDialogueState::Downloading {
                source_url: request.source_url.clone(),
            })
            .await?;

        info!(
            chat_id = %chat_id,
            url = %request.source_url,
            quality = %request.requested_quality,
            audio_only = request.audio_only,
            expected_size,
            "Starting acquisition"
        );

        let engine = Arc::clone(&self.engine);
        let task_request = request.clone();
        let acquired = tokio::task::spawn_blocking(move || engine.acquire(&task_request))
            .await
            .unwrap_or_else(|e| Err(MediaError::Acquisition(format!("download task failed: {e}"))));

        let outcome = match acquired {
            Ok(result) => {
                self.relay(gateway, chat_id, selection.message_id, &request, result, language_code)
                    .await?
            }
            Err(e) => {
                error!(chat_id = %chat_id, url = %request.source_url, error = %e, "Acquisition failed");
                self.report_failure(gateway, chat_id, selection.message_id, &e, language_code)
                    .await?;
                DeliveryOutcome::Failed(e)
            }
        };

        self.finish_session(dialogue, &request.source_url).await?;
        Ok(outcome)
    }

    async fn relay(
        &self,
        gateway: &dyn ChatGateway,
        chat_id: ChatId,
        message_id: Option<MessageId>,
        request: &MediaRequest,
        result: DownloadResult,
        language_code: Option<&str>,
    ) -> Result<DeliveryOutcome> {
        let file = OutgoingFile {
            kind: if request.audio_only {
                OutgoingFileKind::Audio
            } else {
                OutgoingFileKind::Video
            },
            path: result.local_file_path.clone(),
            caption: format_caption(&result, request.audio_only, language_code),
            title: Some(result.title.clone()),
        };

        let sent = gateway.send_file(chat_id, file).await;
        discard_artifact(&result.local_file_path);

        match sent {
            Ok(()) => {
                info!(
                    chat_id = %chat_id,
                    file = %result.filename,
                    size = result.actual_size_bytes,
                    "File delivered"
                );
                let done_key = if request.audio_only { "audio-sent" } else { "video-sent" };
                self.notify(gateway, chat_id, message_id, t_lang(done_key, language_code))
                    .await?;
                Ok(DeliveryOutcome::Delivered(result))
            }
            Err(e) => {
                let failure = MediaError::from_relay_failure(e.to_string());
                error!(chat_id = %chat_id, error = %failure, "Failed to relay file");
                self.report_failure(gateway, chat_id, message_id, &failure, language_code)
                    .await?;
                Ok(DeliveryOutcome::Failed(failure))
            }
        }
    }

    async fn report_failure(
        &self,
        gateway: &dyn ChatGateway,
        chat_id: ChatId,
        message_id: Option<MessageId>,
        failure: &MediaError,
        language_code: Option<&str>,
    ) -> Result<()> {
        let message = if failure.is_size_limit() {
            t_args_lang("error-too-large", &[("limit", &self.limit_mib())], language_code)
        } else {
            t_args_lang(
                "error-download-failed",
                &[("error", &escape(failure.detail()))],
                language_code,
            )
        };
        self.notify(gateway, chat_id, message_id, message).await
    }

    /// Edit the keyboard message when it is reachable, otherwise send a new one
    async fn notify(
        &self,
        gateway: &dyn ChatGateway,
        chat_id: ChatId,
        message_id: Option<MessageId>,
        text: String,
    ) -> Result<()> {
        match message_id {
            Some(message_id) => {
                if let Err(e) = gateway.edit_text(chat_id, message_id, text.clone(), None).await {
                    warn!(chat_id = %chat_id, error = %e, "Failed to edit status message, sending a new one");
                    gateway.send_text(chat_id, text, None).await?;
                }
            }
            None => {
                gateway.send_text(chat_id, text, None).await?;
            }
        }
        Ok(())
    }

    /// Return to Idle unless a newer link replaced the finished one
    async fn finish_session(&self, dialogue: &DownloadDialogue, url: &str) -> Result<()> {
        let still_current = dialogue
            .get()
            .await?
            .is_some_and(|state| state.is_downloading(url));
        if still_current {
            dialogue.update(DownloadDialogueState::Idle).await?;
        }
        Ok(())
    }
}
