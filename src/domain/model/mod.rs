// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod time;

pub use time::{format_hms, parse_range, parse_timestamp};

/// A `(start, end)` time window within a source, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
}

impl Segment {
    /// Create a new segment. `end` must be strictly greater than `start`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Segment length in seconds
    pub fn len_seconds(&self) -> u32 {
        self.end - self.start
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hms(self.start), format_hms(self.end))
    }
}

/// One selectable quality of a resolved source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityOption {
    /// Selector understood by the extractor (e.g. a format id)
    pub id: String,
    /// Human-readable label shown on the menu button
    pub label: String,
    /// Vertical resolution used for ranking; 0 when unknown
    pub height: u32,
    /// Container extension, part of the dedup key
    pub extension: String,
}

impl QualityOption {
    pub fn new(id: impl Into<String>, height: u32, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let label = if height > 0 {
            format!("{}p ({})", height, extension)
        } else {
            format!("best ({})", extension)
        };
        Self {
            id: id.into(),
            label,
            height,
            extension,
        }
    }
}

/// Resolved source metadata
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub title: String,
    pub duration_seconds: u32,
    pub qualities: Vec<QualityOption>,
}

/// How the segments of a job are determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentsSpec {
    /// Positionally planned segments of `clip_len` seconds
    Planned { clip_len: u32, count: u32 },
    /// A single user-supplied range
    Explicit(Segment),
    /// The whole source as one segment
    Full,
}

/// Immutable snapshot of a submitted selection
#[derive(Debug, Clone)]
pub struct Selection {
    pub source: String,
    pub title: String,
    pub quality_id: String,
    pub segments: SegmentsSpec,
}

/// Lifecycle status of a clip job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Planned,
    Downloading,
    Extracting,
    Routing,
    Done,
    Failed,
}

/// An executing unit of work produced from one submitted selection
#[derive(Debug)]
pub struct ClipJob {
    pub id: u64,
    pub selection: Selection,
    pub requested_segments: Vec<Segment>,
    pub status: JobStatus,
    pub progress_percent: u8,
    pub outputs: Vec<ClipArtifact>,
}

impl ClipJob {
    pub fn new(id: u64, selection: Selection) -> Self {
        Self {
            id,
            selection,
            requested_segments: Vec::new(),
            status: JobStatus::Planned,
            progress_percent: 0,
            outputs: Vec::new(),
        }
    }
}

/// Delivery channel chosen for one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Bytes handed directly to the reply channel
    Inline,
    /// Uploaded to the hosting collaborator, delivered as a link
    Hosted,
}

/// One produced clip file plus its delivery outcome
#[derive(Debug, Clone)]
pub struct ClipArtifact {
    /// Present until cleanup removes the local copy
    pub local_path: PathBuf,
    pub size_bytes: u64,
    pub delivery: DeliveryMode,
    pub hosted_link: Option<String>,
    pub failure_reason: Option<String>,
}

impl ClipArtifact {
    pub fn delivered(&self) -> bool {
        self.failure_reason.is_none()
    }
}

/// Final accounting for one job run
#[derive(Debug, Clone, Default)]
pub struct JobOutcome {
    pub succeeded_segments: usize,
    pub failed_segments: Vec<(usize, String)>,
    pub artifacts: Vec<ClipArtifact>,
    /// Set when the job aborted before any segment work
    pub aborted: Option<String>,
}

impl JobOutcome {
    pub fn total_segments(&self) -> usize {
        self.succeeded_segments + self.failed_segments.len()
    }
}

#[cfg(test)]
mod tests;
