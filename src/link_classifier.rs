//! # Link Classifier Module
//!
//! Recognizes YouTube links (watch, short, embed and shorts forms) and pulls
//! the video identifier out of them. Pure pattern matching, no network access.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

// Host prefix shared by every long-form link shape
const HOST_PREFIX: &str = r"(?i)(?:https?://)?(?:www\.|m\.)?";

lazy_static! {
    static ref SUPPORTED_URL_PATTERNS: Vec<Regex> = vec![
        Regex::new(&format!(
            r"{HOST_PREFIX}(?:youtube\.com/watch\?(?:\S*&)?v=|youtube\.com/embed/|youtube\.com/v/)[A-Za-z0-9_-]"
        ))
        .expect("watch/embed pattern should be valid"),
        Regex::new(r"(?i)(?:https?://)?youtu\.be/[A-Za-z0-9_-]")
            .expect("short link pattern should be valid"),
        Regex::new(&format!(r"{HOST_PREFIX}youtube\.com/shorts/[A-Za-z0-9_-]"))
            .expect("shorts pattern should be valid"),
    ];
    static ref VIDEO_ID_PATTERNS: Vec<Regex> = vec![
        Regex::new(
            r"(?:youtube\.com/watch\?(?:\S*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
        )
        .expect("video id pattern should be valid"),
        Regex::new(r"youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)")
            .expect("shorts id pattern should be valid"),
    ];
}

/// Check whether the text is a link to a supported video page
///
/// # Examples
///
/// ```rust
/// use tubedrop::link_classifier::is_supported_url;
///
/// assert!(is_supported_url("https://youtu.be/dQw4w9WgXcQ"));
/// assert!(!is_supported_url("https://example.com/watch?v=dQw4w9WgXcQ"));
/// ```
pub fn is_supported_url(text: &str) -> bool {
    let candidate = text.trim();
    if candidate.is_empty() || candidate.contains(char::is_whitespace) {
        return false;
    }

    let supported = SUPPORTED_URL_PATTERNS
        .iter()
        .any(|pattern| pattern.find(candidate).is_some_and(|m| m.start() == 0));
    trace!(candidate = %candidate, supported, "Classified link");
    supported
}

/// Extract the 11-character video identifier, or an empty string
pub fn extract_id(url: &str) -> String {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url.trim()))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
