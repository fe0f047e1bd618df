//! # Media Error Types Module
//!
//! This module defines the error taxonomy of the download workflow. Every
//! failure ends the current request; callers match on the variant to pick the
//! message shown to the user.

/// Custom error types for probing, acquisition and relay
#[derive(Debug, Clone, PartialEq)]
pub enum MediaError {
    /// Input text is not a supported link
    ClassificationMiss,
    /// Metadata could not be fetched (removed, private, geo-blocked, network)
    Probe(String),
    /// Transfer failed
    Acquisition(String),
    /// The artifact is larger than the delivery channel accepts
    SizeLimitExceeded(String),
    /// The transfer finished without leaving a file behind
    NoArtifactProduced(String),
    /// Sending the file to the chat failed
    Relay(String),
}

impl MediaError {
    /// Whether this error belongs to the acquisition family
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            MediaError::Acquisition(_)
                | MediaError::SizeLimitExceeded(_)
                | MediaError::NoArtifactProduced(_)
        )
    }

    pub fn is_size_limit(&self) -> bool {
        matches!(self, MediaError::SizeLimitExceeded(_))
    }

    /// Build an acquisition error from raw extractor output, singling out
    /// size-limit violations
    pub fn from_transfer_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if mentions_size_limit(&message) {
            MediaError::SizeLimitExceeded(message)
        } else {
            MediaError::Acquisition(message)
        }
    }

    /// Build a relay error, mapping the platform's payload rejection to a
    /// size-limit violation
    pub fn from_relay_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        if mentions_size_limit(&message) {
            MediaError::SizeLimitExceeded(message)
        } else {
            MediaError::Relay(message)
        }
    }

    /// Raw message carried by the error
    pub fn detail(&self) -> &str {
        match self {
            MediaError::ClassificationMiss => "",
            MediaError::Probe(msg)
            | MediaError::Acquisition(msg)
            | MediaError::SizeLimitExceeded(msg)
            | MediaError::NoArtifactProduced(msg)
            | MediaError::Relay(msg) => msg,
        }
    }
}

fn mentions_size_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("filesize")
        || lower.contains("file is larger than")
        || lower.contains("too large")
        || lower.contains("entity too large")
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaError::ClassificationMiss => write!(f, "Unsupported link"),
            MediaError::Probe(msg) => write!(f, "Probe error: {msg}"),
            MediaError::Acquisition(msg) => write!(f, "Acquisition error: {msg}"),
            MediaError::SizeLimitExceeded(msg) => write!(f, "Size limit exceeded: {msg}"),
            MediaError::NoArtifactProduced(msg) => write!(f, "No file produced: {msg}"),
            MediaError::Relay(msg) => write!(f, "Relay error: {msg}"),
        }
    }
}

impl std::error::Error for MediaError {}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::Acquisition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_failure_classification() {
        let err = MediaError::from_transfer_failure("File is larger than max-filesize (52428800 bytes)");
        assert!(err.is_size_limit());
        assert!(err.is_acquisition_failure());

        let err = MediaError::from_transfer_failure("HTTP Error 403: Forbidden");
        assert_eq!(err, MediaError::Acquisition("HTTP Error 403: Forbidden".to_string()));
    }

    #[test]
    fn test_relay_failure_classification() {
        let err = MediaError::from_relay_failure("Request Entity Too Large");
        assert!(err.is_size_limit());

        let err = MediaError::from_relay_failure("network unreachable");
        assert!(matches!(err, MediaError::Relay(_)));
        assert!(!err.is_acquisition_failure());
    }

    #[test]
    fn test_display() {
        let err = MediaError::Probe("Video unavailable".to_string());
        assert_eq!(err.to_string(), "Probe error: Video unavailable");
        assert_eq!(err.detail(), "Video unavailable");
    }
}
