//! # Configuration Module
//!
//! This module defines configuration structures for media acquisition and the
//! bot runtime, including the size ceiling, scratch location and session limits.

use anyhow::{Context, Result};
use std::path::PathBuf;

// Constants for acquisition configuration
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50MB Telegram upload ceiling
pub const DEFAULT_ASSUMED_MBPS: f64 = 10.0;
pub const DEFAULT_FALLBACK_TIER: u32 = 720;
pub const DEFAULT_AUDIO_CODEC: &str = "mp3";
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 192;
pub const DEFAULT_SCRATCH_DIR: &str = "temp_downloads";
pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 60;

/// Settings handed to the acquisition engine and the extractor
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Largest artifact the delivery channel accepts, in bytes
    pub max_file_size: u64,
    /// Tier forced when the probed size exceeds the ceiling
    pub fallback_tier: u32,
    /// Target codec for audio extraction
    pub audio_codec: String,
    /// Target bitrate for audio extraction in kbps
    pub audio_bitrate_kbps: u32,
    /// Parent directory for per-request scratch directories
    pub scratch_dir: PathBuf,
    /// Path or name of the yt-dlp executable
    pub ytdlp_path: String,
    /// Suppress extractor output
    pub quiet: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            fallback_tier: DEFAULT_FALLBACK_TIER,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate_kbps: DEFAULT_AUDIO_BITRATE_KBPS,
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            ytdlp_path: DEFAULT_YTDLP_PATH.to_string(),
            quiet: true,
        }
    }
}

impl AcquisitionConfig {
    /// Size ceiling in whole MiB, as used in extractor format filters
    pub fn max_file_size_mib(&self) -> u64 {
        (self.max_file_size / (1024 * 1024)).max(1)
    }
}

/// Runtime configuration of the download bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot credential
    pub token: String,
    /// Transfer rate assumed for ETA estimates, in Mbps
    pub assumed_mbps: f64,
    /// Seconds a probed link stays selectable
    pub session_ttl_secs: i64,
    /// Acquisition settings
    pub acquisition: AcquisitionConfig,
}

impl BotConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("TELEGRAM_BOT_TOKEN")
            .or_else(|| lookup("BOT_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .context("TELEGRAM_BOT_TOKEN (or BOT_TOKEN) must be set")?;

        let mut acquisition = AcquisitionConfig::default();

        if let Some(dir) = lookup("SCRATCH_DIR") {
            acquisition.scratch_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("YTDLP_PATH") {
            acquisition.ytdlp_path = path;
        }
        if let Some(raw) = lookup("MAX_FILE_SIZE_MB") {
            let mib: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("MAX_FILE_SIZE_MB is not a number: {raw}"))?;
            acquisition.max_file_size = mib * 1024 * 1024;
        }

        let assumed_mbps = match lookup("ASSUMED_MBPS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("ASSUMED_MBPS is not a number: {raw}"))?,
            None => DEFAULT_ASSUMED_MBPS,
        };

        let session_ttl_secs = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("SESSION_TTL_SECS is not a number: {raw}"))?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            token,
            assumed_mbps,
            session_ttl_secs,
            acquisition,
        })
    }
}
