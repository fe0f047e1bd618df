//! # Media Data Model
//!
//! Types exchanged between the prober, the acquisition engine and the
//! delivery orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Requested video quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitySelector {
    /// Best stream under the size ceiling
    Best,
    /// Smallest stream, uncapped
    Worst,
    /// Best stream at or below this vertical resolution
    Tier(u32),
}

impl QualitySelector {
    /// Label shown to users: `720p`, `best` or `worst`
    pub fn label(&self) -> String {
        match self {
            QualitySelector::Tier(tier) => format!("{tier}p"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for QualitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualitySelector::Best => write!(f, "best"),
            QualitySelector::Worst => write!(f, "worst"),
            QualitySelector::Tier(tier) => write!(f, "{tier}"),
        }
    }
}

impl FromStr for QualitySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "best" => Ok(QualitySelector::Best),
            "worst" => Ok(QualitySelector::Worst),
            other => other
                .strip_suffix('p')
                .unwrap_or(other)
                .parse::<u32>()
                .ok()
                .filter(|tier| *tier > 0)
                .map(QualitySelector::Tier)
                .ok_or_else(|| format!("unknown quality selector: {s}")),
        }
    }
}

/// What the user picked on the format keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatChoice {
    Video(QualitySelector),
    Audio,
}

const AUDIO_CALLBACK: &str = "audio";
const QUALITY_CALLBACK_PREFIX: &str = "q:";

impl FormatChoice {
    /// Encode the choice as inline keyboard callback data
    pub fn to_callback_data(&self) -> String {
        match self {
            FormatChoice::Audio => AUDIO_CALLBACK.to_string(),
            FormatChoice::Video(selector) => format!("{QUALITY_CALLBACK_PREFIX}{selector}"),
        }
    }

    /// Decode callback data produced by `to_callback_data`
    pub fn from_callback_data(data: &str) -> Option<Self> {
        if data == AUDIO_CALLBACK {
            return Some(FormatChoice::Audio);
        }
        data.strip_prefix(QUALITY_CALLBACK_PREFIX)
            .and_then(|raw| raw.parse().ok())
            .map(FormatChoice::Video)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, FormatChoice::Audio)
    }
}

/// One acquisition request, built per user interaction
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub source_url: String,
    pub requested_quality: QualitySelector,
    pub audio_only: bool,
}

impl MediaRequest {
    pub fn new(source_url: impl Into<String>, choice: FormatChoice) -> Self {
        let (requested_quality, audio_only) = match choice {
            FormatChoice::Audio => (QualitySelector::Best, true),
            FormatChoice::Video(selector) => (selector, false),
        };
        Self {
            source_url: source_url.into(),
            requested_quality,
            audio_only,
        }
    }
}

/// Metadata reported by the prober, without the media payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    pub duration_seconds: u64,
    pub uploader: Option<String>,
    /// Distinct vertical resolutions, highest first
    pub available_quality_tiers: Vec<u32>,
    /// Smallest reported size per tier
    pub tier_sizes: BTreeMap<u32, u64>,
    /// Best-effort size of the whole media
    pub estimated_size_bytes: u64,
}

impl MediaMetadata {
    /// Size to expect for a given choice, falling back to the overall estimate
    pub fn expected_size(&self, selector: QualitySelector) -> u64 {
        match selector {
            QualitySelector::Tier(tier) => self
                .tier_sizes
                .get(&tier)
                .copied()
                .unwrap_or(self.estimated_size_bytes),
            QualitySelector::Worst => self
                .tier_sizes
                .values()
                .copied()
                .min()
                .unwrap_or(self.estimated_size_bytes),
            QualitySelector::Best => self.estimated_size_bytes,
        }
    }
}

/// A finished transfer, owned by the orchestrator until relayed and deleted
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub local_file_path: PathBuf,
    pub title: String,
    pub duration_seconds: u64,
    pub actual_size_bytes: u64,
    pub filename: String,
    /// Quality label of the delivered video, `None` for audio
    pub resolved_quality: Option<String>,
}
