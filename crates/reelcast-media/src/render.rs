//! Platform rendition engine.
//!
//! One invocation produces one platform-conformant output file. Geometry is
//! decided here from the variant's transform directive; the fixed output
//! profile (mp4 / H.264 / AAC / 2000k / 128k / 30fps) matches what every
//! supported platform accepts.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use reelcast_models::{Transform, VariantConfig, VideoMetadata, DEFAULT_PADDING_COLOR};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters;

/// Output video codec (H.264)
pub const VIDEO_CODEC: &str = "libx264";
/// Output audio codec
pub const AUDIO_CODEC: &str = "aac";
/// Output video bitrate target
pub const VIDEO_BITRATE: &str = "2000k";
/// Output audio bitrate
pub const AUDIO_BITRATE: &str = "128k";
/// Output frame rate
pub const OUTPUT_FPS: u32 = 30;
/// Output container
pub const OUTPUT_CONTAINER: &str = "mp4";

/// Actual dimensions of a finished rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenditionDimensions {
    pub width: u32,
    pub height: u32,
}

/// Square crop geometry: crop side is the smaller source dimension, output
/// side is that value capped at the variant's max width.
pub fn crop_square_dims(metadata: &VideoMetadata, config: &VariantConfig) -> (u32, u32) {
    let crop = metadata.width.min(metadata.height);
    let out = crop.min(config.max_width);
    (crop, out)
}

/// Padded target box: the exact target aspect fitted inside the variant's
/// max bounds, using the larger-fitting dimension. A wider-than-target
/// source fits the width; a taller one fits the height.
///
/// Dimensions come from plain centered arithmetic; odd values are possible
/// and some H.264 encoders want even ones.
pub fn padded_dims(metadata: &VideoMetadata, config: &VariantConfig) -> RenditionDimensions {
    let target_ratio = config.target_aspect.as_f64();

    if metadata.aspect_ratio > target_ratio {
        let width = config.max_width;
        RenditionDimensions {
            width,
            height: (width as f64 / target_ratio).round() as u32,
        }
    } else {
        let height = config.max_height;
        RenditionDimensions {
            width: (height as f64 * target_ratio).round() as u32,
            height,
        }
    }
}

/// Scale-to-fit geometry: shrink an oversized source preserving its own
/// aspect ratio; pass small sources through unchanged.
pub fn scaled_dims(metadata: &VideoMetadata, config: &VariantConfig) -> RenditionDimensions {
    if metadata.width > config.max_width || metadata.height > config.max_height {
        let target_ratio = config.target_aspect.as_f64();
        if metadata.aspect_ratio > target_ratio {
            let width = config.max_width;
            RenditionDimensions {
                width,
                height: (width as f64 / metadata.aspect_ratio).round() as u32,
            }
        } else {
            let height = config.max_height;
            RenditionDimensions {
                width: (height as f64 * metadata.aspect_ratio).round() as u32,
                height,
            }
        }
    } else {
        RenditionDimensions {
            width: metadata.width,
            height: metadata.height,
        }
    }
}

/// Executes transformation plans against source files.
#[derive(Debug, Clone, Default)]
pub struct RenditionEngine {
    runner: FfmpegRunner,
}

impl RenditionEngine {
    pub fn new() -> Self {
        Self {
            runner: FfmpegRunner::new(),
        }
    }

    /// Apply a wall-clock deadline to every render.
    pub fn with_timeout(secs: u64) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(secs),
        }
    }

    /// Render one platform variant from the source file.
    ///
    /// Returns the output's dimensions on success. Any transcoder failure
    /// surfaces as an error for the caller to record against this variant;
    /// it carries no implication for sibling variants.
    pub async fn render(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        config: &VariantConfig,
        original: &VideoMetadata,
    ) -> MediaResult<RenditionDimensions> {
        let input = input.as_ref();
        let output = output.as_ref();

        let mut cmd = FfmpegCommand::new(input, output);

        let dims = match config.transform {
            Transform::CropToSquare => {
                let (crop, out) = crop_square_dims(original, config);
                cmd = cmd.video_filter(filters::filter_center_crop_square(crop, out));
                RenditionDimensions {
                    width: out,
                    height: out,
                }
            }
            Transform::AddPadding => {
                let dims = padded_dims(original, config);
                let color = config
                    .padding_color
                    .as_deref()
                    .unwrap_or(DEFAULT_PADDING_COLOR);
                cmd = cmd.video_filter(filters::filter_scale_pad(dims.width, dims.height, color));
                dims
            }
            Transform::None => {
                let dims = scaled_dims(original, config);
                if dims.width != original.width || dims.height != original.height {
                    cmd = cmd.video_filter(filters::filter_scale(dims.width, dims.height));
                }
                dims
            }
        };

        cmd = cmd
            .container(OUTPUT_CONTAINER)
            .video_codec(VIDEO_CODEC)
            .audio_codec(AUDIO_CODEC)
            .video_bitrate(VIDEO_BITRATE)
            .audio_bitrate(AUDIO_BITRATE)
            .frame_rate(OUTPUT_FPS);

        debug!(
            input = %input.display(),
            output = %output.display(),
            transform = %config.transform,
            width = dims.width,
            height = dims.height,
            "Rendering platform variant"
        );

        let start = Instant::now();
        self.runner.run(&cmd).await?;
        let elapsed = start.elapsed().as_secs_f64();

        metrics::histogram!("reelcast_ffmpeg_duration_seconds").record(elapsed);
        info!(
            output = %output.display(),
            duration_secs = format!("{elapsed:.1}"),
            "Rendition complete"
        );

        Ok(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcast_models::{base_spec, plan_for_format, CameraFormat};

    fn meta(width: u32, height: u32) -> VideoMetadata {
        VideoMetadata::new(width, height, 30.0, 30.0, "h264", 0, 0)
    }

    #[test]
    fn test_crop_square_capped_at_max_width() {
        let config = base_spec("instagram_feed").unwrap();

        // 1920x1080 source: crop side 1080, already at the 1080 cap
        let (crop, out) = crop_square_dims(&meta(1920, 1080), &config);
        assert_eq!(crop, 1080);
        assert_eq!(out, 1080);

        // 4K source: crop side 2160, capped to 1080 on output
        let (crop, out) = crop_square_dims(&meta(3840, 2160), &config);
        assert_eq!(crop, 2160);
        assert_eq!(out, 1080);

        // Portrait phone source: crop side is the width
        let (crop, out) = crop_square_dims(&meta(1080, 1920), &config);
        assert_eq!(crop, 1080);
        assert_eq!(out, 1080);
    }

    #[test]
    fn test_padded_dims_hit_target_aspect_exactly() {
        // Landscape source pillarboxed into TikTok portrait
        let plans = plan_for_format(CameraFormat::LandscapeSd);
        let config = &plans["tiktok"];
        let dims = padded_dims(&meta(1280, 720), config);

        assert_eq!(dims.height, 1920);
        let ratio = dims.width as f64 / dims.height as f64;
        let target = config.target_aspect.as_f64();
        // Within a pixel of 9:16 after rounding
        assert!((ratio - target).abs() * dims.height as f64 <= 1.0);
    }

    #[test]
    fn test_padded_dims_letterbox_wider_source() {
        // Portrait source letterboxed into Facebook landscape: source ratio
        // is below the target, so the height is fitted
        let plans = plan_for_format(CameraFormat::Portrait);
        let config = &plans["facebook"];
        let dims = padded_dims(&meta(1080, 1920), config);

        assert_eq!(dims.height, 1080);
        assert_eq!(dims.width, 1920);
    }

    #[test]
    fn test_scaled_dims_passthrough_when_within_bounds() {
        let config = base_spec("facebook").unwrap();
        let dims = scaled_dims(&meta(1280, 720), &config);
        assert_eq!(dims.width, 1280);
        assert_eq!(dims.height, 720);
    }

    #[test]
    fn test_scaled_dims_shrinks_oversized_source() {
        let config = base_spec("facebook").unwrap();
        let dims = scaled_dims(&meta(3840, 2160), &config);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_scaled_dims_preserves_source_aspect() {
        // Ultrawide source scaled into the Facebook box keeps its own ratio
        let config = base_spec("facebook").unwrap();
        let source = meta(5120, 2160);
        let dims = scaled_dims(&source, &config);
        assert_eq!(dims.width, 1920);
        let ratio = dims.width as f64 / dims.height as f64;
        assert!((ratio - source.aspect_ratio).abs() < 0.01);
    }
}
