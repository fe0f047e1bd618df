mod common;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use common::{sample_info, MockExtractor, MIB};
use tubedrop::acquisition::{discard_artifact, AcquisitionEngine};
use tubedrop::config::AcquisitionConfig;
use tubedrop::prober::estimate_total_size;
use tubedrop::media_errors::MediaError;
use tubedrop::media_model::{FormatChoice, MediaRequest, QualitySelector};

const URL: &str = "https://youtu.be/dQw4w9WgXcQ";

fn engine_with(extractor: Arc<MockExtractor>, scratch: &TempDir) -> AcquisitionEngine {
    let config = AcquisitionConfig {
        scratch_dir: scratch.path().to_path_buf(),
        ..Default::default()
    };
    AcquisitionEngine::new(extractor, config)
}

fn scratch_entries(scratch: &TempDir) -> usize {
    fs::read_dir(scratch.path()).map(|dir| dir.count()).unwrap_or(0)
}

#[test]
fn test_oversized_probe_falls_back_before_transfer() {
    let scratch = TempDir::new().unwrap();
    let extractor = Arc::new(MockExtractor::new(sample_info(80 * MIB), 4 * MIB));
    let engine = engine_with(Arc::clone(&extractor), &scratch);

    let request = MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Tier(1080)));
    let result = engine.acquire(&request).unwrap();

    let downloads = extractor.recorded_downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(
        downloads[0].format,
        "best[height<=720][filesize<50M]/best[filesize<50M]"
    );
    assert_eq!(result.resolved_quality.as_deref(), Some("720p"));
    assert_eq!(result.actual_size_bytes, 4 * MIB);
    assert_eq!(result.title, "Test Clip");
    assert_eq!(result.duration_seconds, 212);
    assert!(result.local_file_path.is_file());

    discard_artifact(&result.local_file_path);
    assert!(!result.local_file_path.exists());
    assert_eq!(scratch_entries(&scratch), 0);
}

#[test]
fn test_fallback_uses_variant_size_when_total_is_missing() {
    let scratch = TempDir::new().unwrap();
    let mut info = sample_info(0);
    info.filesize = None;
    info.formats[3].filesize = Some(80 * MIB);
    assert_eq!(estimate_total_size(&info), 80 * MIB);

    let extractor = Arc::new(MockExtractor::new(info, MIB));
    let engine = engine_with(Arc::clone(&extractor), &scratch);

    let request = MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Best));
    let result = engine.acquire(&request).unwrap();

    assert_eq!(
        extractor.recorded_downloads()[0].format,
        "best[height<=720][filesize<50M]/best[filesize<50M]"
    );
    assert_eq!(result.resolved_quality.as_deref(), Some("720p"));
    discard_artifact(&result.local_file_path);
}

#[test]
fn test_small_media_keeps_requested_tier() {
    let scratch = TempDir::new().unwrap();
    let extractor = Arc::new(MockExtractor::new(sample_info(20 * MIB), MIB));
    let engine = engine_with(Arc::clone(&extractor), &scratch);

    let request = MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Tier(360)));
    let result = engine.acquire(&request).unwrap();

    assert_eq!(
        extractor.recorded_downloads()[0].format,
        "best[height<=360][filesize<50M]/best[filesize<50M]"
    );
    assert_eq!(result.resolved_quality.as_deref(), Some("360p"));
    discard_artifact(&result.local_file_path);
}

#[test]
fn test_worst_is_never_capped() {
    let scratch = TempDir::new().unwrap();
    let extractor = Arc::new(MockExtractor::new(sample_info(500 * MIB), MIB));
    let engine = engine_with(Arc::clone(&extractor), &scratch);

    let request = MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Worst));
    let result = engine.acquire(&request).unwrap();

    assert_eq!(extractor.recorded_downloads()[0].format, "worst");
    discard_artifact(&result.local_file_path);
}

#[test]
fn test_audio_request_extracts_mp3() {
    let scratch = TempDir::new().unwrap();
    let extractor = Arc::new(MockExtractor::new(sample_info(20 * MIB), 2 * MIB));
    let engine = engine_with(Arc::clone(&extractor), &scratch);

    let result = engine
        .acquire(&MediaRequest::new(URL, FormatChoice::Audio))
        .unwrap();

    let options = &extractor.recorded_downloads()[0];
    let audio = options.audio.as_ref().expect("audio extraction requested");
    assert_eq!(audio.codec, "mp3");
    assert_eq!(audio.bitrate_kbps, 192);
    assert!(result.filename.ends_with(".mp3"));
    assert_eq!(result.resolved_quality, None);
    discard_artifact(&result.local_file_path);
}

#[test]
fn test_unreported_path_is_found_in_scratch_dir() {
    let scratch = TempDir::new().unwrap();
    let mut mock = MockExtractor::new(sample_info(20 * MIB), MIB);
    mock.report_path = false;
    let engine = engine_with(Arc::new(mock), &scratch);

    let result = engine
        .acquire(&MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Best)))
        .unwrap();
    assert_eq!(result.filename, "Test Clip.mp4");
    discard_artifact(&result.local_file_path);
}

#[test]
fn test_no_artifact_is_an_error_and_leaves_nothing_behind() {
    let scratch = TempDir::new().unwrap();
    let mut mock = MockExtractor::new(sample_info(20 * MIB), 0);
    mock.artifact_size = None;
    let engine = engine_with(Arc::new(mock), &scratch);

    let err = engine
        .acquire(&MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Best)))
        .unwrap_err();
    assert!(matches!(err, MediaError::NoArtifactProduced(_)));
    assert_eq!(scratch_entries(&scratch), 0);
}

#[test]
fn test_oversized_artifact_is_rejected_and_removed() {
    let scratch = TempDir::new().unwrap();
    let extractor = Arc::new(MockExtractor::new(sample_info(0), 4096));
    let config = AcquisitionConfig {
        scratch_dir: scratch.path().to_path_buf(),
        max_file_size: 1024,
        ..Default::default()
    };
    let engine = AcquisitionEngine::new(extractor, config);

    let err = engine
        .acquire(&MediaRequest::new(URL, FormatChoice::Video(QualitySelector::Worst)))
        .unwrap_err();
    assert!(err.is_size_limit());
    assert_eq!(scratch_entries(&scratch), 0);
}

#[test]
fn test_probe_failure_surfaces_as_acquisition_error() {
    let scratch = TempDir::new().unwrap();
    let engine = engine_with(Arc::new(MockExtractor::failing_probe("Video unavailable")), &scratch);

    let err = engine
        .acquire(&MediaRequest::new(URL, FormatChoice::Audio))
        .unwrap_err();
    assert_eq!(err, MediaError::Acquisition("Video unavailable".to_string()));
}
