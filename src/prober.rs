//! # Metadata Prober Module
//!
//! Turns the extractor's info document into `MediaMetadata`: title, duration,
//! the quality tiers on offer and a size estimate for each of them.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::extractor::{MediaExtractor, RawMediaInfo};
use crate::media_errors::MediaError;
use crate::media_model::MediaMetadata;

/// Metadata-only queries against the extractor
pub struct MetadataProber {
    extractor: Arc<dyn MediaExtractor>,
}

impl MetadataProber {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    /// Probe a link without transferring the media payload (blocking)
    pub fn probe(&self, url: &str) -> Result<MediaMetadata, MediaError> {
        let raw = self.extractor.extract_info(url).map_err(|e| match e {
            MediaError::Probe(_) => e,
            other => MediaError::Probe(other.detail().to_string()),
        })?;

        let metadata = build_metadata(&raw);
        info!(
            url = %url,
            title = %metadata.title,
            tiers = ?metadata.available_quality_tiers,
            estimated_size = metadata.estimated_size_bytes,
            "Metadata probe completed"
        );
        Ok(metadata)
    }
}

/// Smallest reported size per video tier; first seen wins on equal sizes
pub fn collect_tier_sizes(raw: &RawMediaInfo) -> (Vec<u32>, BTreeMap<u32, u64>) {
    let mut tiers: Vec<u32> = Vec::new();
    let mut sizes: BTreeMap<u32, u64> = BTreeMap::new();

    for format in raw.formats.iter().filter(|f| f.has_video()) {
        let Some(height) = format.height.filter(|h| *h > 0) else {
            continue;
        };

        if !tiers.contains(&height) {
            tiers.push(height);
        }

        if let Some(size) = format.size() {
            sizes
                .entry(height)
                .and_modify(|current| {
                    if size < *current {
                        *current = size;
                    }
                })
                .or_insert(size);
        }
    }

    tiers.sort_unstable_by(|a, b| b.cmp(a));
    (tiers, sizes)
}

/// Best-effort size: the direct field, else the largest variant, else zero
pub fn estimate_total_size(raw: &RawMediaInfo) -> u64 {
    if let Some(size) = raw.reported_size() {
        return size;
    }

    match raw.formats.iter().filter_map(|f| f.size()).max() {
        Some(size) => {
            debug!(size, "No direct size reported, using largest format variant");
            size
        }
        None => {
            warn!("No size reported for any format variant");
            0
        }
    }
}

/// Build metadata from the extractor's info document
pub fn build_metadata(raw: &RawMediaInfo) -> MediaMetadata {
    let (available_quality_tiers, tier_sizes) = collect_tier_sizes(raw);

    MediaMetadata {
        title: raw
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "video".to_string()),
        duration_seconds: raw.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
        uploader: raw.uploader.clone(),
        available_quality_tiers,
        tier_sizes,
        estimated_size_bytes: estimate_total_size(raw),
    }
}
