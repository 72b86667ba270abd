//! Per-file analysis records and processing status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{CameraFormat, VariantConfig, VideoMetadata};

/// Upload-time facts about a source file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OriginalAnalysis {
    pub metadata: VideoMetadata,
    pub camera_format: CameraFormat,
}

/// Outcome of one rendition attempt.
///
/// At most one result exists per (file, variant); a later run for the same
/// variant overwrites the entry with a freshly timestamped result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RenditionResult {
    Ready {
        width: u32,
        height: u32,
        url: String,
        config: VariantConfig,
        processed_at: DateTime<Utc>,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config: Option<VariantConfig>,
        processed_at: DateTime<Utc>,
    },
}

impl RenditionResult {
    pub fn ready(width: u32, height: u32, url: impl Into<String>, config: VariantConfig) -> Self {
        Self::Ready {
            width,
            height,
            url: url.into(),
            config,
            processed_at: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>, config: Option<VariantConfig>) -> Self {
        Self::Failed {
            error: error.into(),
            config,
            processed_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        match self {
            Self::Ready { processed_at, .. } | Self::Failed { processed_at, .. } => *processed_at,
        }
    }
}

/// The persisted state for one uploaded file: its classification plus every
/// per-variant rendition outcome so far. Mutated one entry at a time as
/// renditions finish, never deleted automatically.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    pub original: OriginalAnalysis,

    /// Whether upload-time analysis ran for this file
    #[serde(default)]
    pub analyzed: bool,

    /// Rendition outcomes keyed by platform variant id
    #[serde(default)]
    pub processed: BTreeMap<String, RenditionResult>,
}

impl AnalysisRecord {
    pub fn new(metadata: VideoMetadata, camera_format: CameraFormat) -> Self {
        Self {
            original: OriginalAnalysis {
                metadata,
                camera_format,
            },
            analyzed: true,
            processed: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the result for a variant.
    pub fn record_result(&mut self, variant: impl Into<String>, result: RenditionResult) {
        self.processed.insert(variant.into(), result);
    }

    pub fn has_results(&self) -> bool {
        !self.processed.is_empty()
    }

    /// Status reported for this record.
    ///
    /// `Completed` means at least one variant has a terminal entry, not that
    /// every requested variant finished; callers inspect `processed` to see
    /// which variants are present.
    pub fn status(&self) -> ProcessingStatus {
        if self.has_results() {
            ProcessingStatus::Completed
        } else {
            ProcessingStatus::Analyzed
        }
    }
}

/// File-level failure record, written when a run cannot proceed at all
/// (e.g. the container has no video stream).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingFailure {
    pub error: String,

    /// Platforms the failed run was asked for
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,

    pub timestamp: DateTime<Utc>,
}

impl ProcessingFailure {
    pub fn new(error: impl Into<String>, platforms: Vec<String>) -> Self {
        Self {
            error: error.into(),
            platforms,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle of a file as seen by polling clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// No analysis record yet
    Analyzing,
    /// Record exists, no rendition results yet
    Analyzed,
    /// A processing run was accepted and is underway
    Processing,
    /// At least one rendition has a terminal result
    Completed,
    /// File-level failure
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Analyzing => "analyzing",
            ProcessingStatus::Analyzed => "analyzed",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
