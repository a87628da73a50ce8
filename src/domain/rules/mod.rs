// Domain rules - Segment planning and delivery policies

use crate::domain::model::{DeliveryMode, QualityOption, Segment};

/// Upper bound on quality buttons shown on the menu
pub const MENU_QUALITY_LIMIT: usize = 6;

/// Minimum seconds of source per offered clip on the count selector
pub const MIN_SECONDS_PER_CLIP: u32 = 5;

/// Compute clip start offsets from duration, clip length, and count.
///
/// This is a deterministic positional heuristic, not content analysis: for
/// `i = 1..=count` the candidate start is `floor(duration * i / (count + 1))`
/// shifted left by half a clip length, clamped into `[0, duration - len]`.
/// Segments may overlap when `count` is large relative to `duration / len`.
pub fn plan_segments(duration: u32, clip_len: u32, count: u32) -> Vec<Segment> {
    if duration == 0 || clip_len == 0 || count == 0 {
        return Vec::new();
    }

    // Source shorter than one clip: a single segment covering everything
    if duration <= clip_len {
        return vec![Segment {
            start: 0,
            end: duration,
        }];
    }

    let max_start = (duration - clip_len) as i64;
    let mut segments = Vec::with_capacity(count as usize);
    for i in 1..=count as u64 {
        let center_floor = (duration as u64 * i / (count as u64 + 1)) as i64;
        let candidate = center_floor - (clip_len / 2) as i64;
        let start = candidate.clamp(0, max_start) as u32;
        segments.push(Segment {
            start,
            end: start + clip_len,
        });
    }
    segments
}

/// Threshold policy for artifact delivery.
///
/// Boundary convention: strictly below the threshold goes Inline, at or
/// above goes Hosted.
pub fn delivery_for_size(size_bytes: u64, threshold_bytes: u64) -> DeliveryMode {
    if size_bytes < threshold_bytes {
        DeliveryMode::Inline
    } else {
        DeliveryMode::Hosted
    }
}

/// Normalize a resolver's quality list for menu rendering.
///
/// Sorted by height descending, deduplicated by `(height, extension)`, and
/// capped at [`MENU_QUALITY_LIMIT`] entries.
pub fn normalize_qualities(mut raw: Vec<QualityOption>) -> Vec<QualityOption> {
    raw.sort_by(|a, b| b.height.cmp(&a.height));
    let mut seen = std::collections::HashSet::new();
    raw.retain(|q| seen.insert((q.height, q.extension.clone())));
    raw.truncate(MENU_QUALITY_LIMIT);
    raw
}

/// Cap the count selector by source length: one clip per five seconds,
/// at least one, never more than the configured maximum.
pub fn suggested_max_clips(duration: u32, max_clips: u32) -> u32 {
    (duration / MIN_SECONDS_PER_CLIP).clamp(1, max_clips.max(1))
}
