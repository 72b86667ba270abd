//! Raw video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata extracted from an uploaded video file.
///
/// Produced once per upload and immutable afterwards. When the probe tool is
/// unavailable or cannot read the container, [`VideoMetadata::fallback`] is
/// substituted so the upload still succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
    /// Width divided by height
    pub aspect_ratio: f64,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec name
    pub codec: String,
    /// Bitrate in bits/second
    pub bitrate: u64,
    /// File size in bytes
    pub file_size: u64,
}

impl VideoMetadata {
    /// Create metadata from probed stream facts. The aspect ratio is always
    /// derived from the dimensions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: u32,
        height: u32,
        duration: f64,
        fps: f64,
        codec: impl Into<String>,
        bitrate: u64,
        file_size: u64,
    ) -> Self {
        Self {
            width,
            height,
            duration,
            aspect_ratio: width as f64 / height as f64,
            fps,
            codec: codec.into(),
            bitrate,
            file_size,
        }
    }

    /// Fallback record used when probing fails. Only the byte size is real;
    /// the rest are plausible defaults for a 16:9 HD clip.
    pub fn fallback(file_size: u64) -> Self {
        Self {
            width: 1920,
            height: 1080,
            duration: 30.0,
            aspect_ratio: 16.0 / 9.0,
            fps: 30.0,
            codec: "unknown".to_string(),
            bitrate: 0,
            file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_derived_from_dimensions() {
        let meta = VideoMetadata::new(1080, 1920, 12.5, 30.0, "h264", 1_500_000, 4_000_000);
        assert!((meta.aspect_ratio - 0.5625).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_defaults() {
        let meta = VideoMetadata::fallback(1234);
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert_eq!(meta.codec, "unknown");
        assert_eq!(meta.file_size, 1234);
        assert!((meta.aspect_ratio - 16.0 / 9.0).abs() < 1e-9);
    }
}
