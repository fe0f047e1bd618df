//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html::escape;

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import media types
use crate::estimator::{format_clock, format_duration, format_megabytes};
use crate::media_model::{DownloadResult, FormatChoice, MediaMetadata, QualitySelector};

/// Tiers offered on the keyboard when the media reports them
pub const STANDARD_TIERS: [u32; 8] = [2160, 1440, 1080, 720, 480, 360, 240, 144];
const TIER_BUTTONS_PER_ROW: usize = 2;

/// Create the format keyboard for a probed link
pub fn create_format_keyboard(metadata: &MediaMetadata, language_code: Option<&str>) -> InlineKeyboardMarkup {
    let tier_buttons: Vec<InlineKeyboardButton> = STANDARD_TIERS
        .iter()
        .filter(|tier| metadata.available_quality_tiers.contains(tier))
        .map(|tier| {
            let label = match metadata.tier_sizes.get(tier) {
                Some(size) => format!("📹 {tier}p (~{} MB)", format_megabytes(*size)),
                None => format!("📹 {tier}p"),
            };
            InlineKeyboardButton::callback(
                label,
                FormatChoice::Video(QualitySelector::Tier(*tier)).to_callback_data(),
            )
        })
        .collect();

    let mut rows: Vec<Vec<InlineKeyboardButton>> = tier_buttons
        .chunks(TIER_BUTTONS_PER_ROW)
        .map(|chunk| chunk.to_vec())
        .collect();

    // Best and audio are always offered
    rows.push(vec![
        InlineKeyboardButton::callback(
            t_lang("button-best", language_code),
            FormatChoice::Video(QualitySelector::Best).to_callback_data(),
        ),
        InlineKeyboardButton::callback(
            t_lang("button-audio", language_code),
            FormatChoice::Audio.to_callback_data(),
        ),
    ]);

    InlineKeyboardMarkup::new(rows)
}

/// Summary shown above the format keyboard
pub fn format_metadata_summary(metadata: &MediaMetadata, language_code: Option<&str>) -> String {
    let uploader = metadata
        .uploader
        .clone()
        .unwrap_or_else(|| t_lang("unknown-uploader", language_code));

    t_args_lang(
        "choose-format",
        &[
            ("title", &escape(&metadata.title)),
            ("uploader", &escape(&uploader)),
            ("duration", &format_duration(metadata.duration_seconds)),
            ("size", &format_megabytes(metadata.estimated_size_bytes)),
        ],
        language_code,
    )
}

/// Human label for a quality selector
pub fn quality_display(label: &str, language_code: Option<&str>) -> String {
    match label {
        "best" => t_lang("quality-best", language_code),
        "worst" => t_lang("quality-worst", language_code),
        other => other.to_string(),
    }
}

/// Caption attached to a delivered file
pub fn format_caption(result: &DownloadResult, audio_only: bool, language_code: Option<&str>) -> String {
    let icon = if audio_only { "🎵" } else { "📹" };
    let mut caption = format!(
        "{icon} <b>{}</b>\n\n{}: {} MB\n{}: {}",
        escape(&result.title),
        t_lang("caption-size", language_code),
        format_megabytes(result.actual_size_bytes),
        t_lang("caption-duration", language_code),
        format_clock(result.duration_seconds)
    );

    if !audio_only {
        if let Some(quality) = &result.resolved_quality {
            caption.push_str(&format!(
                "\n{}: {}",
                t_lang("caption-quality", language_code),
                quality_display(quality, language_code)
            ));
        }
    }

    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_keyboard_lists_available_tiers_and_audio() {
        let metadata = MediaMetadata {
            available_quality_tiers: vec![1080, 720, 360, 123],
            tier_sizes: BTreeMap::from([(720, 10 * 1024 * 1024)]),
            ..Default::default()
        };

        let data = callback_data(&create_format_keyboard(&metadata, Some("en")));
        assert_eq!(data, vec!["q:1080", "q:720", "q:360", "q:best", "audio"]);
    }

    #[test]
    fn test_keyboard_always_offers_audio() {
        let data = callback_data(&create_format_keyboard(&MediaMetadata::default(), None));
        assert_eq!(data, vec!["q:best", "audio"]);
    }

    #[test]
    fn test_caption_for_video_includes_quality() {
        let result = DownloadResult {
            local_file_path: PathBuf::from("/tmp/a.mp4"),
            title: "Tom & Jerry".to_string(),
            duration_seconds: 125,
            actual_size_bytes: 5 * 1024 * 1024,
            filename: "a.mp4".to_string(),
            resolved_quality: Some("720p".to_string()),
        };

        let caption = format_caption(&result, false, Some("en"));
        assert!(caption.contains("Tom &amp; Jerry"));
        assert!(caption.contains("5.00 MB"));
        assert!(caption.contains("2:05"));
        assert!(caption.contains("720p"));
    }
}
