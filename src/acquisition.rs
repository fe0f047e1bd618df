//! # Acquisition Engine Module
//!
//! Performs the actual transfer for a `MediaRequest`. The size ceiling is
//! enforced in two phases: the format filter always carries the cap, and when
//! the probed size already exceeds it the engine switches to a lower tier
//! before any bytes are transferred.
//!
//! Every acquisition writes into its own scratch subdirectory, so concurrent
//! requests never see each other's output.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::extractor::{AudioExtraction, DownloadOptions, MediaExtractor};
use crate::media_errors::MediaError;
use crate::media_model::{DownloadResult, MediaRequest, QualitySelector};
use crate::prober::estimate_total_size;

const OUTPUT_TEMPLATE: &str = "%(title).150B.%(ext)s";
const SCRATCH_PREFIX: &str = "acq-";

/// Format decisions for one request
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionPlan {
    pub format: String,
    pub audio: Option<AudioExtraction>,
    /// Label of the quality that will be delivered, `None` for audio
    pub resolved_quality: Option<String>,
    /// Whether the stricter fallback constraint replaced the requested one
    pub fell_back: bool,
}

pub struct AcquisitionEngine {
    extractor: Arc<dyn MediaExtractor>,
    config: AcquisitionConfig,
}

impl AcquisitionEngine {
    pub fn new(extractor: Arc<dyn MediaExtractor>, config: AcquisitionConfig) -> Self {
        Self { extractor, config }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Format specification for a selector, before any size-based fallback
    pub fn format_spec(&self, selector: QualitySelector, audio_only: bool) -> String {
        let cap = self.config.max_file_size_mib();
        if audio_only {
            return "bestaudio/best".to_string();
        }
        match selector {
            QualitySelector::Best => format!("best[filesize<{cap}M]/best"),
            QualitySelector::Worst => "worst".to_string(),
            QualitySelector::Tier(tier) => {
                format!("best[height<={tier}][filesize<{cap}M]/best[filesize<{cap}M]")
            }
        }
    }

    /// Stricter constraint used when the probed size exceeds the ceiling
    pub fn fallback_format_spec(&self, tier: u32) -> String {
        let cap = self.config.max_file_size_mib();
        format!("best[height<={tier}][filesize<{cap}M]/best[filesize<{cap}M]")
    }

    /// Decide the format for a request given the size reported by the probe
    pub fn plan(&self, request: &MediaRequest, probed_size: u64) -> AcquisitionPlan {
        if request.audio_only {
            return AcquisitionPlan {
                format: self.format_spec(request.requested_quality, true),
                audio: Some(AudioExtraction {
                    codec: self.config.audio_codec.clone(),
                    bitrate_kbps: self.config.audio_bitrate_kbps,
                }),
                resolved_quality: None,
                fell_back: false,
            };
        }

        let over_ceiling = probed_size > self.config.max_file_size;
        let fallback_tier = match request.requested_quality {
            QualitySelector::Best if over_ceiling => Some(self.config.fallback_tier),
            QualitySelector::Tier(tier) if over_ceiling => Some(tier.min(self.config.fallback_tier)),
            // Worst is already the smallest stream and stays uncapped
            _ => None,
        };

        match fallback_tier {
            Some(tier) => AcquisitionPlan {
                format: self.fallback_format_spec(tier),
                audio: None,
                resolved_quality: Some(format!("{tier}p")),
                fell_back: true,
            },
            None => AcquisitionPlan {
                format: self.format_spec(request.requested_quality, false),
                audio: None,
                resolved_quality: Some(request.requested_quality.label()),
                fell_back: false,
            },
        }
    }

    /// Probe, plan and transfer one request (blocking)
    ///
    /// The returned file is left in place; deleting it is up to the caller.
    pub fn acquire(&self, request: &MediaRequest) -> Result<DownloadResult, MediaError> {
        let url = request.source_url.as_str();

        let info = self
            .extractor
            .extract_info(url)
            .map_err(|e| MediaError::Acquisition(e.detail().to_string()))?;
        // Same estimate the user saw: top-level size, else the largest variant
        let probed_size = estimate_total_size(&info);

        let plan = self.plan(request, probed_size);
        if plan.fell_back {
            warn!(
                url = %url,
                probed_size,
                max_size = self.config.max_file_size,
                format = %plan.format,
                "Probed size exceeds ceiling, using stricter format"
            );
        }

        fs::create_dir_all(&self.config.scratch_dir)?;
        let workdir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.config.scratch_dir)?;

        let options = DownloadOptions {
            output_template: workdir.path().join(OUTPUT_TEMPLATE),
            quiet: self.config.quiet,
            format: plan.format.clone(),
            audio: plan.audio.clone(),
        };

        // Any early return below drops `workdir` and removes partial output
        let reported = self.extractor.download(url, &options)?;
        let file_path = match reported {
            Some(path) => path,
            None => find_artifact(workdir.path())?.ok_or_else(|| {
                MediaError::NoArtifactProduced(format!(
                    "nothing written to {}",
                    workdir.path().display()
                ))
            })?,
        };

        let actual_size_bytes = fs::metadata(&file_path)?.len();
        if actual_size_bytes > self.config.max_file_size {
            return Err(MediaError::SizeLimitExceeded(format!(
                "file is {actual_size_bytes} bytes, limit is {} bytes",
                self.config.max_file_size
            )));
        }

        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        // Hand ownership of the directory to the caller
        let _kept = workdir.keep();

        info!(
            url = %url,
            file = %file_path.display(),
            size = actual_size_bytes,
            "Acquisition completed"
        );

        Ok(DownloadResult {
            local_file_path: file_path,
            title: info
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "video".to_string()),
            duration_seconds: info.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
            actual_size_bytes,
            filename,
            resolved_quality: plan.resolved_quality,
        })
    }
}

/// First regular file in a scratch directory
fn find_artifact(dir: &Path) -> Result<Option<PathBuf>, MediaError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files.into_iter().next())
}

/// Remove a delivered artifact and its scratch directory. Failures are logged
/// and otherwise ignored.
pub fn discard_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Scratch file removed"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch file"),
    }

    if let Some(parent) = path.parent() {
        let is_scratch_dir = parent
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(SCRATCH_PREFIX));
        if is_scratch_dir {
            if let Err(e) = fs::remove_dir_all(parent) {
                debug!(dir = %parent.display(), error = %e, "Failed to remove scratch directory");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::RawMediaInfo;

    struct NoopExtractor;

    impl MediaExtractor for NoopExtractor {
        fn extract_info(&self, _url: &str) -> Result<RawMediaInfo, MediaError> {
            Ok(RawMediaInfo::default())
        }

        fn download(&self, _url: &str, _options: &DownloadOptions) -> Result<Option<PathBuf>, MediaError> {
            Ok(None)
        }
    }

    fn engine() -> AcquisitionEngine {
        AcquisitionEngine::new(Arc::new(NoopExtractor), AcquisitionConfig::default())
    }

    fn video_request(selector: QualitySelector) -> MediaRequest {
        MediaRequest {
            source_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            requested_quality: selector,
            audio_only: false,
        }
    }

    #[test]
    fn test_format_specs() {
        let engine = engine();
        assert_eq!(engine.format_spec(QualitySelector::Best, false), "best[filesize<50M]/best");
        assert_eq!(engine.format_spec(QualitySelector::Worst, false), "worst");
        assert_eq!(
            engine.format_spec(QualitySelector::Tier(480), false),
            "best[height<=480][filesize<50M]/best[filesize<50M]"
        );
        assert_eq!(engine.format_spec(QualitySelector::Tier(480), true), "bestaudio/best");
    }

    #[test]
    fn test_plan_within_ceiling_keeps_selection() {
        let plan = engine().plan(&video_request(QualitySelector::Tier(1080)), 10 * 1024 * 1024);
        assert!(!plan.fell_back);
        assert_eq!(plan.resolved_quality.as_deref(), Some("1080p"));
    }

    #[test]
    fn test_plan_lower_tier_is_not_raised() {
        let plan = engine().plan(&video_request(QualitySelector::Tier(360)), 200 * 1024 * 1024);
        assert!(plan.fell_back);
        assert_eq!(plan.format, "best[height<=360][filesize<50M]/best[filesize<50M]");
    }

    #[test]
    fn test_plan_best_over_ceiling_falls_back_to_720() {
        let plan = engine().plan(&video_request(QualitySelector::Best), 80 * 1024 * 1024);
        assert!(plan.fell_back);
        assert_eq!(plan.format, "best[height<=720][filesize<50M]/best[filesize<50M]");
        assert_eq!(plan.resolved_quality.as_deref(), Some("720p"));
    }

    #[test]
    fn test_plan_worst_is_uncapped() {
        let plan = engine().plan(&video_request(QualitySelector::Worst), 200 * 1024 * 1024);
        assert!(!plan.fell_back);
        assert_eq!(plan.format, "worst");
    }

    #[test]
    fn test_find_artifact_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_artifact(dir.path()).unwrap(), None);
    }
}
