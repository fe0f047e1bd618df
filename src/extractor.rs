//! # Extractor Module
//!
//! Boundary to the external media extraction tool. `MediaExtractor` is the
//! seam the prober and the acquisition engine depend on; `YtDlpExtractor`
//! implements it by running the `yt-dlp` executable. All calls block and must
//! be run off the async dispatcher.

use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::media_errors::MediaError;

/// Info document reported by the extractor (subset of yt-dlp's JSON)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

impl RawMediaInfo {
    /// Direct best-effort size reported at the top level
    pub fn reported_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

/// One format variant reported by the extractor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
}

impl RawFormat {
    pub fn size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// Whether the variant carries a video stream
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref().map_or(true, |codec| codec != "none")
    }
}

/// Audio post-processing applied after the transfer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioExtraction {
    pub codec: String,
    pub bitrate_kbps: u32,
}

/// Options for one transfer
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOptions {
    /// Output path template; `%(ext)s` is replaced by the extractor
    pub output_template: PathBuf,
    pub quiet: bool,
    /// Format specification string
    pub format: String,
    pub audio: Option<AudioExtraction>,
}

/// Blocking access to the media extraction tool
pub trait MediaExtractor: Send + Sync {
    /// Fetch metadata only, never the media payload
    fn extract_info(&self, url: &str) -> Result<RawMediaInfo, MediaError>;

    /// Transfer the media; returns the produced file path when the tool reports it
    fn download(&self, url: &str, options: &DownloadOptions) -> Result<Option<PathBuf>, MediaError>;
}

/// Extractor backed by the `yt-dlp` command line tool
pub struct YtDlpExtractor {
    binary: String,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &AcquisitionConfig) -> Self {
        Self::new(config.ytdlp_path.clone())
    }

    /// Check that the yt-dlp binary can be executed
    pub fn check_availability(&self) -> bool {
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!(version = %version.trim(), "yt-dlp is available");
                true
            }
            Ok(output) => {
                warn!(status = %output.status, "yt-dlp --version failed");
                false
            }
            Err(e) => {
                warn!(binary = %self.binary, error = %e, "yt-dlp not found");
                false
            }
        }
    }

    /// Command line arguments for a transfer
    pub fn download_args(url: &str, options: &DownloadOptions) -> Vec<String> {
        let mut args = vec![
            "--output".to_string(),
            options.output_template.to_string_lossy().to_string(),
            "--format".to_string(),
            options.format.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];

        if options.quiet {
            args.push("--quiet".to_string());
        }

        if let Some(audio) = &options.audio {
            args.extend([
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                audio.codec.clone(),
                "--audio-quality".to_string(),
                format!("{}K", audio.bitrate_kbps),
            ]);
        }

        // Final path after post-processing, one line on stdout
        args.extend([
            "--print".to_string(),
            "after_move:filepath".to_string(),
            "--no-simulate".to_string(),
            url.to_string(),
        ]);
        args
    }

    fn run(&self, args: &[String]) -> Result<std::process::Output, String> {
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.binary))
    }
}

fn stderr_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .filter(|line| !line.trim().is_empty())
        .last()
        .unwrap_or("")
        .trim()
        .to_string();
    if message.is_empty() {
        format!("yt-dlp exited with {}", output.status)
    } else {
        message
    }
}

/// Parse the JSON document printed by `--dump-single-json`
pub fn parse_info_json(json: &str) -> Result<RawMediaInfo, MediaError> {
    serde_json::from_str(json).map_err(|e| MediaError::Probe(format!("malformed metadata: {e}")))
}

impl MediaExtractor for YtDlpExtractor {
    fn extract_info(&self, url: &str) -> Result<RawMediaInfo, MediaError> {
        debug!(url = %url, "Extracting metadata with yt-dlp");

        let args: Vec<String> = [
            "--dump-single-json",
            "--no-download",
            "--no-playlist",
            "--no-warnings",
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let output = self.run(&args).map_err(MediaError::Probe)?;
        if !output.status.success() {
            return Err(MediaError::Probe(stderr_message(&output)));
        }

        parse_info_json(&String::from_utf8_lossy(&output.stdout))
    }

    fn download(&self, url: &str, options: &DownloadOptions) -> Result<Option<PathBuf>, MediaError> {
        info!(url = %url, format = %options.format, audio = options.audio.is_some(), "Starting yt-dlp transfer");

        let args = Self::download_args(url, options);
        let output = self.run(&args).map_err(MediaError::Acquisition)?;
        if !output.status.success() {
            return Err(MediaError::from_transfer_failure(stderr_message(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reported = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(PathBuf::from)
            .filter(|path| path.is_file());

        debug!(reported = ?reported, "yt-dlp transfer finished");
        Ok(reported)
    }
}
