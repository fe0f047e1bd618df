//! Download dialogue module for per-chat session state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::media_model::MediaMetadata;

/// Conversation state of one chat with the download bot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum DownloadDialogueState {
    #[default]
    Idle,
    AwaitingFormatChoice {
        source_url: String,
        metadata: MediaMetadata,
        probed_at: DateTime<Utc>,
    },
    Downloading {
        source_url: String,
    },
}

/// Type alias for the download dialogue
pub type DownloadDialogue = Dialogue<DownloadDialogueState, InMemStorage<DownloadDialogueState>>;

/// A link waiting for the user's format choice
#[derive(Clone, Debug, PartialEq)]
pub struct PendingLink {
    pub source_url: String,
    pub metadata: MediaMetadata,
}

/// Result of looking up the pending link for a format choice
#[derive(Clone, Debug, PartialEq)]
pub enum PendingLookup {
    Ready(PendingLink),
    /// No link stored, or it outlived the session TTL
    NotFound,
    /// A transfer for this chat is still running
    Busy,
}

impl DownloadDialogueState {
    /// Resolve the link a format choice refers to
    pub fn pending_link(&self, now: DateTime<Utc>, ttl: Duration) -> PendingLookup {
        match self {
            DownloadDialogueState::AwaitingFormatChoice {
                source_url,
                metadata,
                probed_at,
            } => {
                if now.signed_duration_since(*probed_at) > ttl {
                    PendingLookup::NotFound
                } else {
                    PendingLookup::Ready(PendingLink {
                        source_url: source_url.clone(),
                        metadata: metadata.clone(),
                    })
                }
            }
            DownloadDialogueState::Downloading { .. } => PendingLookup::Busy,
            DownloadDialogueState::Idle => PendingLookup::NotFound,
        }
    }

    /// Whether the state still refers to a transfer of this link
    pub fn is_downloading(&self, url: &str) -> bool {
        matches!(self, DownloadDialogueState::Downloading { source_url } if source_url == url)
    }
}
