//! Shared data models for the reelcast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Raw video metadata and the probe fallback record
//! - Camera format classification
//! - Platform variant specs and per-format rendition plans
//! - Analysis records and per-variant rendition results

pub mod analysis;
pub mod format;
pub mod metadata;
pub mod platform;

// Re-export common types
pub use analysis::{
    AnalysisRecord, OriginalAnalysis, ProcessingFailure, ProcessingStatus, RenditionResult,
};
pub use format::CameraFormat;
pub use metadata::VideoMetadata;
pub use platform::{
    base_spec, plan_for_format, AspectRatio, AspectRatioParseError, Transform, VariantConfig,
    DEFAULT_PADDING_COLOR, PLATFORM_VARIANTS,
};
