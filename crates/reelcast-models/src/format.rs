//! Camera format classification.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VideoMetadata;

/// Absolute tolerance around each canonical aspect ratio.
const RATIO_TOLERANCE: f64 = 0.1;

/// Minimum width for the HD side of the landscape split.
const HD_MIN_WIDTH: u32 = 1920;

/// Canonical orientation/aspect bucket for a source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CameraFormat {
    /// 9:16 phone vertical
    Portrait,
    /// 16:9 at 1920px wide or more
    LandscapeHd,
    /// 16:9 below 1920px wide
    LandscapeSd,
    /// 1:1
    Square,
    /// 4:3
    Standard,
    /// Wider than 2:1
    Ultrawide,
    /// Taller than 1:2
    UltraPortrait,
    /// Anything else
    Custom,
}

impl CameraFormat {
    /// Classify raw metadata into a camera format.
    ///
    /// Bands are checked in a fixed order and the first match wins, so a
    /// ratio that lands inside two bands resolves deterministically. Every
    /// input maps to some format; `Custom` is the catch-all.
    pub fn classify(metadata: &VideoMetadata) -> Self {
        let ratio = metadata.aspect_ratio;

        if (ratio - 16.0 / 9.0).abs() < RATIO_TOLERANCE {
            if metadata.width >= HD_MIN_WIDTH {
                CameraFormat::LandscapeHd
            } else {
                CameraFormat::LandscapeSd
            }
        } else if (ratio - 9.0 / 16.0).abs() < RATIO_TOLERANCE {
            CameraFormat::Portrait
        } else if (ratio - 1.0).abs() < RATIO_TOLERANCE {
            CameraFormat::Square
        } else if (ratio - 4.0 / 3.0).abs() < RATIO_TOLERANCE {
            CameraFormat::Standard
        } else if ratio > 2.0 {
            CameraFormat::Ultrawide
        } else if ratio < 0.5 {
            CameraFormat::UltraPortrait
        } else {
            CameraFormat::Custom
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFormat::Portrait => "portrait",
            CameraFormat::LandscapeHd => "landscape_hd",
            CameraFormat::LandscapeSd => "landscape_sd",
            CameraFormat::Square => "square",
            CameraFormat::Standard => "standard",
            CameraFormat::Ultrawide => "ultrawide",
            CameraFormat::UltraPortrait => "ultra_portrait",
            CameraFormat::Custom => "custom",
        }
    }
}

impl fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(width: u32, height: u32) -> VideoMetadata {
        VideoMetadata::new(width, height, 30.0, 30.0, "h264", 0, 0)
    }

    #[test]
    fn test_landscape_split_on_width() {
        assert_eq!(CameraFormat::classify(&meta(1920, 1080)), CameraFormat::LandscapeHd);
        assert_eq!(CameraFormat::classify(&meta(3840, 2160)), CameraFormat::LandscapeHd);
        assert_eq!(CameraFormat::classify(&meta(1280, 720)), CameraFormat::LandscapeSd);
        assert_eq!(CameraFormat::classify(&meta(854, 480)), CameraFormat::LandscapeSd);
    }

    #[test]
    fn test_portrait_square_standard() {
        assert_eq!(CameraFormat::classify(&meta(1080, 1920)), CameraFormat::Portrait);
        assert_eq!(CameraFormat::classify(&meta(1080, 1080)), CameraFormat::Square);
        assert_eq!(CameraFormat::classify(&meta(1440, 1080)), CameraFormat::Standard);
    }

    #[test]
    fn test_extreme_ratios() {
        assert_eq!(CameraFormat::classify(&meta(2560, 1080)), CameraFormat::Ultrawide);
        assert_eq!(CameraFormat::classify(&meta(1080, 2400)), CameraFormat::UltraPortrait);
    }

    #[test]
    fn test_custom_catch_all() {
        // 1.5 sits between every band
        assert_eq!(CameraFormat::classify(&meta(1500, 1000)), CameraFormat::Custom);
    }

    #[test]
    fn test_first_band_wins_near_overlap() {
        // 1.05 is inside the square band only; 1.695 is inside the 16:9 band
        assert_eq!(CameraFormat::classify(&meta(1050, 1000)), CameraFormat::Square);
        assert_eq!(CameraFormat::classify(&meta(1695, 1000)), CameraFormat::LandscapeSd);
    }

    #[test]
    fn test_deterministic() {
        let m = meta(1280, 720);
        assert_eq!(CameraFormat::classify(&m), CameraFormat::classify(&m));
    }
}
