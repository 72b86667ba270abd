//! Platform variant specifications and the per-format rendition plan.
//!
//! Each social platform variant (e.g. `instagram_reels`) carries static
//! constraints: maximum dimensions, target aspect ratio, container
//! whitelist, and file-size/duration ceilings. [`plan_for_format`] overlays
//! a transform directive on those base specs according to the source's
//! camera format: native-orientation variants are passed through untouched,
//! mismatched orientations get letterbox/pillarbox padding, and the square
//! feed gets a center crop.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::CameraFormat;

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * MB;

/// Padding fill used when a plan does not specify one.
pub const DEFAULT_PADDING_COLOR: &str = "black";

/// Every platform variant the planner knows about.
pub const PLATFORM_VARIANTS: &[&str] = &[
    "facebook",
    "instagram_feed",
    "instagram_reels",
    "tiktok",
    "youtube_regular",
    "youtube_shorts",
];

/// Target aspect ratio, serialized as a `W:H` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Landscape (16:9) for Facebook and regular YouTube
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Portrait (9:16) for TikTok, Reels and Shorts
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Square (1:1) for the Instagram feed
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| AspectRatioParseError::InvalidFormat(s.to_string()))?;

        let width = w
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(w.to_string()))?;
        let height = h
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(h.to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.to_string()
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = AspectRatioParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl JsonSchema for AspectRatio {
    fn schema_name() -> String {
        "AspectRatio".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),

    #[error("Invalid aspect ratio component: {0}")]
    InvalidNumber(String),

    #[error("Aspect ratio components must be non-zero")]
    ZeroValue,
}

/// Geometry transform applied when rendering a variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Scale down to fit the max bounds; no reframing
    #[default]
    None,
    /// Center-crop to a square, capped at the variant's max width
    CropToSquare,
    /// Scale to fit the target aspect, fill the remainder with a solid color
    AddPadding,
}

impl Transform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::None => "none",
            Transform::CropToSquare => "crop_to_square",
            Transform::AddPadding => "add_padding",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A platform variant's constraints plus the transform chosen by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariantConfig {
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Aspect ratio the platform expects
    pub target_aspect: AspectRatio,
    /// Accepted container formats
    pub formats: Vec<String>,
    /// Upload ceiling in bytes
    pub max_file_size_bytes: u64,
    /// Upload ceiling in seconds
    pub max_duration_secs: u32,
    /// Geometry transform for this plan
    #[serde(default)]
    pub transform: Transform,
    /// Padding fill color, set when `transform` is `AddPadding`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_color: Option<String>,
}

impl VariantConfig {
    fn new(
        max_width: u32,
        max_height: u32,
        target_aspect: AspectRatio,
        max_file_size_bytes: u64,
        max_duration_secs: u32,
    ) -> Self {
        Self {
            max_width,
            max_height,
            target_aspect,
            formats: vec!["mp4".to_string()],
            max_file_size_bytes,
            max_duration_secs,
            transform: Transform::None,
            padding_color: None,
        }
    }

    fn crop_to_square(mut self) -> Self {
        self.transform = Transform::CropToSquare;
        self
    }

    fn with_padding(mut self) -> Self {
        self.transform = Transform::AddPadding;
        self.padding_color = Some(DEFAULT_PADDING_COLOR.to_string());
        self
    }
}

/// Base constraints for a platform variant, transform unset.
///
/// Returns `None` for identifiers the planner does not know, which the
/// orchestrator records as a per-variant configuration error.
pub fn base_spec(variant: &str) -> Option<VariantConfig> {
    let spec = match variant {
        "facebook" => VariantConfig::new(1920, 1080, AspectRatio::LANDSCAPE, 4 * GB, 240),
        "instagram_feed" => VariantConfig::new(1080, 1080, AspectRatio::SQUARE, 100 * MB, 60),
        "instagram_reels" => VariantConfig::new(1080, 1920, AspectRatio::PORTRAIT, 100 * MB, 90),
        "tiktok" => VariantConfig::new(1080, 1920, AspectRatio::PORTRAIT, 500 * MB, 180),
        "youtube_regular" => VariantConfig::new(1920, 1080, AspectRatio::LANDSCAPE, 256 * GB, 43200),
        "youtube_shorts" => VariantConfig::new(1080, 1920, AspectRatio::PORTRAIT, 15 * GB, 60),
        _ => return None,
    };
    Some(spec)
}

fn spec(variant: &str) -> VariantConfig {
    base_spec(variant).unwrap_or_else(|| panic!("unknown built-in variant {variant}"))
}

/// Compute the rendition plan for a camera format.
///
/// Native-orientation variants keep `Transform::None`; orientation
/// mismatches get content-preserving padding rather than a crop, except the
/// square Instagram feed which deliberately center-crops. Formats without a
/// dedicated plan offer every variant with its base config and rely on the
/// engine's scale-to-fit path.
pub fn plan_for_format(format: CameraFormat) -> BTreeMap<String, VariantConfig> {
    let mut plans = BTreeMap::new();

    match format {
        CameraFormat::Portrait => {
            plans.insert("tiktok".to_string(), spec("tiktok"));
            plans.insert("instagram_reels".to_string(), spec("instagram_reels"));
            plans.insert("youtube_shorts".to_string(), spec("youtube_shorts"));
            plans.insert(
                "instagram_feed".to_string(),
                spec("instagram_feed").crop_to_square(),
            );
            plans.insert("facebook".to_string(), spec("facebook").with_padding());
        }
        CameraFormat::LandscapeHd | CameraFormat::LandscapeSd => {
            plans.insert("facebook".to_string(), spec("facebook"));
            plans.insert("youtube_regular".to_string(), spec("youtube_regular"));
            plans.insert(
                "instagram_feed".to_string(),
                spec("instagram_feed").crop_to_square(),
            );
            plans.insert("tiktok".to_string(), spec("tiktok").with_padding());
            plans.insert(
                "instagram_reels".to_string(),
                spec("instagram_reels").with_padding(),
            );
        }
        CameraFormat::Square => {
            plans.insert("instagram_feed".to_string(), spec("instagram_feed"));
            plans.insert("facebook".to_string(), spec("facebook").with_padding());
            plans.insert("tiktok".to_string(), spec("tiktok").with_padding());
            plans.insert(
                "youtube_regular".to_string(),
                spec("youtube_regular").with_padding(),
            );
        }
        CameraFormat::Standard
        | CameraFormat::Ultrawide
        | CameraFormat::UltraPortrait
        | CameraFormat::Custom => {
            for variant in PLATFORM_VARIANTS {
                plans.insert(variant.to_string(), spec(variant));
            }
        }
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse_and_display() {
        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(ratio, AspectRatio::LANDSCAPE);
        assert_eq!(ratio.to_string(), "16:9");
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_aspect_ratio_serializes_as_string() {
        let json = serde_json::to_string(&AspectRatio::PORTRAIT).unwrap();
        assert_eq!(json, "\"9:16\"");
        let back: AspectRatio = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AspectRatio::PORTRAIT);
    }

    #[test]
    fn test_portrait_plan() {
        let plans = plan_for_format(CameraFormat::Portrait);

        assert_eq!(plans["tiktok"].transform, Transform::None);
        assert_eq!(plans["instagram_reels"].transform, Transform::None);
        assert_eq!(plans["youtube_shorts"].transform, Transform::None);
        assert_eq!(plans["instagram_feed"].transform, Transform::CropToSquare);
        assert_eq!(plans["facebook"].transform, Transform::AddPadding);
        assert_eq!(
            plans["facebook"].padding_color.as_deref(),
            Some(DEFAULT_PADDING_COLOR)
        );
        assert!(!plans.contains_key("youtube_regular"));
    }

    #[test]
    fn test_landscape_plans_match_for_hd_and_sd() {
        for format in [CameraFormat::LandscapeHd, CameraFormat::LandscapeSd] {
            let plans = plan_for_format(format);
            assert_eq!(plans["facebook"].transform, Transform::None);
            assert_eq!(plans["youtube_regular"].transform, Transform::None);
            assert_eq!(plans["instagram_feed"].transform, Transform::CropToSquare);
            assert_eq!(plans["tiktok"].transform, Transform::AddPadding);
            assert_eq!(plans["instagram_reels"].transform, Transform::AddPadding);
        }
    }

    #[test]
    fn test_square_plan() {
        let plans = plan_for_format(CameraFormat::Square);
        assert_eq!(plans["instagram_feed"].transform, Transform::None);
        for variant in ["facebook", "tiktok", "youtube_regular"] {
            assert_eq!(plans[variant].transform, Transform::AddPadding);
        }
    }

    #[test]
    fn test_fallthrough_formats_offer_all_variants() {
        for format in [
            CameraFormat::Standard,
            CameraFormat::Ultrawide,
            CameraFormat::UltraPortrait,
            CameraFormat::Custom,
        ] {
            let plans = plan_for_format(format);
            assert_eq!(plans.len(), PLATFORM_VARIANTS.len());
            assert!(plans.values().all(|p| p.transform == Transform::None));
        }
    }

    #[test]
    fn test_unknown_variant_has_no_spec() {
        assert!(base_spec("bogus_platform").is_none());
    }

    #[test]
    fn test_variant_ceilings() {
        let tiktok = base_spec("tiktok").unwrap();
        assert_eq!(tiktok.max_width, 1080);
        assert_eq!(tiktok.max_height, 1920);
        assert_eq!(tiktok.max_file_size_bytes, 500 * MB);
        assert_eq!(tiktok.max_duration_secs, 180);

        let youtube = base_spec("youtube_regular").unwrap();
        assert_eq!(youtube.max_duration_secs, 43200);
    }
}
