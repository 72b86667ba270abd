//! FFmpeg filter chains for geometry transforms.

/// Centered square crop followed by a scale to the output size.
pub fn filter_center_crop_square(crop_size: u32, out_size: u32) -> String {
    format!(
        "crop={crop}:{crop}:(iw-{crop})/2:(ih-{crop})/2,scale={out}:{out}",
        crop = crop_size,
        out = out_size,
    )
}

/// Scale to fit inside the target box without distortion, then pad the
/// remainder with a solid color, centered.
pub fn filter_scale_pad(width: u32, height: u32, color: &str) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:{color}"
    )
}

/// Plain scale to exact output dimensions.
pub fn filter_scale(width: u32, height: u32) -> String {
    format!("scale={width}:{height}")
}
