//! # Size/Time Estimator Module
//!
//! Pure arithmetic used when talking to the user about a transfer: ETA from a
//! byte count, and the duration/size renderings used in captions.

use crate::config::DEFAULT_ASSUMED_MBPS;

/// Multiplier covering connection setup, retries and post-processing
pub const OVERHEAD_FACTOR: f64 = 1.2;
/// Smallest ETA ever reported, in seconds
pub const MIN_ESTIMATE_SECS: u64 = 5;

/// Estimate how long a transfer of `size_bytes` takes at `assumed_mbps`
///
/// Non-positive or non-finite rates fall back to the default rate.
///
/// # Examples
///
/// ```rust
/// use tubedrop::estimator::estimate_seconds;
///
/// // 100 MB at 10 Mbps is 80s on the wire, 96s with overhead
/// assert_eq!(estimate_seconds(100_000_000, 10.0), 96);
/// assert_eq!(estimate_seconds(0, 10.0), 5);
/// ```
pub fn estimate_seconds(size_bytes: u64, assumed_mbps: f64) -> u64 {
    let mbps = if assumed_mbps.is_finite() && assumed_mbps > 0.0 {
        assumed_mbps
    } else {
        DEFAULT_ASSUMED_MBPS
    };

    let bytes_per_second = mbps * 1_000_000.0 / 8.0;
    let seconds = (size_bytes as f64 / bytes_per_second) * OVERHEAD_FACTOR;

    (seconds as u64).max(MIN_ESTIMATE_SECS)
}

/// Render a number of seconds in the largest fitting bucket
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds} сек")
    } else if seconds < 3600 {
        format!("{} мин {} сек", seconds / 60, seconds % 60)
    } else {
        format!("{} ч {} мин", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Render a media duration as `M:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render a byte count as megabytes with two decimals
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Approximate size of an audio track of the given length and bitrate
pub fn audio_size_bytes(duration_seconds: u64, bitrate_kbps: u32) -> u64 {
    duration_seconds
        .saturating_mul(u64::from(bitrate_kbps))
        .saturating_mul(1000)
        / 8
}
